use crate::infra::{
    load_screening_service, parse_credit_history, parse_employment, parse_kernel,
    parse_property_area,
};
use clap::Args;
use loan_screen::config::AppConfig;
use loan_screen::error::AppError;
use loan_screen::workflows::credit::{
    ApplicantRecord, CreditHistory, EmploymentType, EvaluationReport, EvaluationRequest, Kernel,
    PropertyArea,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Applicant monthly income
    #[arg(long)]
    pub(crate) income: f64,
    /// Requested loan amount
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Credit history: clean or issues
    #[arg(long, default_value = "clean", value_parser = parse_credit_history)]
    pub(crate) credit: CreditHistory,
    /// Employment type: salaried or self-employed
    #[arg(long, default_value = "salaried", value_parser = parse_employment)]
    pub(crate) employment: EmploymentType,
    /// Property area: urban, semiurban or rural
    #[arg(long, default_value = "urban", value_parser = parse_property_area)]
    pub(crate) area: PropertyArea,
    /// Kernel to evaluate with (defaults to APP_DEFAULT_KERNEL)
    #[arg(long, value_parser = parse_kernel)]
    pub(crate) kernel: Option<Kernel>,
    /// Directory holding the trained artifacts (defaults to APP_MODEL_DIR)
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory holding the trained artifacts (defaults to APP_MODEL_DIR)
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        income,
        loan_amount,
        credit,
        employment,
        area,
        kernel,
        model_dir,
    } = args;

    let config = AppConfig::load()?;
    let model_dir = model_dir.unwrap_or_else(|| config.models.artifact_dir.clone());
    let service = load_screening_service(&config, &model_dir)?;

    let applicant = ApplicantRecord {
        monthly_income: income,
        loan_amount,
        credit_history: credit,
        employment,
        property_area: area,
    };
    let request = EvaluationRequest {
        applicant,
        kernel,
    };

    let report = service.evaluate(request)?;
    render_decision(&applicant, &report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let model_dir = args
        .model_dir
        .unwrap_or_else(|| config.models.artifact_dir.clone());
    let service = load_screening_service(&config, &model_dir)?;

    let applicant = sample_applicant();
    println!("Loan screening demo");
    println!(
        "Sample applicant: income {:.0} | loan {:.0} | {} | {} | {}",
        applicant.monthly_income,
        applicant.loan_amount,
        applicant.credit_history.label(),
        applicant.employment.label(),
        applicant.property_area.label()
    );

    for status in service.kernels() {
        println!();
        if !status.loaded {
            println!("{} SVM: not trained ({} missing)", status.label, status.artifact);
            continue;
        }

        match service.evaluate(EvaluationRequest::new(applicant).with_kernel(status.kernel)) {
            Ok(report) => render_decision(&applicant, &report),
            Err(err) => println!("{} SVM: evaluation unavailable: {}", status.label, err),
        }
    }

    Ok(())
}

fn sample_applicant() -> ApplicantRecord {
    ApplicantRecord {
        monthly_income: 4000.0,
        loan_amount: 120.0,
        credit_history: CreditHistory::Clean,
        employment: EmploymentType::Salaried,
        property_area: PropertyArea::Urban,
    }
}

fn render_decision(applicant: &ApplicantRecord, report: &EvaluationReport) {
    let view = report.view();
    println!("Decision: {}", view.decision);
    println!("Kernel: {} SVM", view.kernel_label);
    println!("Decided by: {}", view.source);
    println!("Confidence: {:.1}%", view.confidence);
    println!(
        "Inputs: income {:.0} | loan {:.0} | {}",
        applicant.monthly_income,
        applicant.loan_amount,
        applicant.credit_history.label()
    );
    println!("Model insight: {}", view.insight);
    println!("Summary: {}", report.outcome.summary());
}
