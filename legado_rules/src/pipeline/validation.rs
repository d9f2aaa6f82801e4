use crate::logging::codes;

/// Startup check over every stage's codes and limits
pub fn validate_pipeline() -> Result<(), String> {
    let stages: [(&str, fn() -> Result<(), String>); 3] = [
        ("file processing", crate::file_processor::init_file_processor_logging),
        ("lexical analysis", crate::lexical::init_lexical_analysis_logging),
        ("source loading", crate::source::init_source_logging),
    ];
    for (name, init) in stages {
        init().map_err(|e| format!("{name} is not ready: {e}"))?;
    }

    codes::ensure_registered(
        "pipeline",
        &[
            codes::pipeline::PIPELINE_FAILURE,
            codes::pipeline::RULE_REJECTED,
            codes::success::CLASSIFICATION_COMPLETE,
            codes::success::SOURCE_ANALYSIS_COMPLETE,
            codes::success::PIPELINE_COMPLETE,
        ],
    )?;

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline ready",
        "stages" => stages.len() + 1
    );
    Ok(())
}

