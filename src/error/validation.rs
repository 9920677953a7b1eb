use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid stage '{value}'. Expected 'duration:target' (e.g. 30s:5).")]
    InvalidStageFormat { value: String },
    #[error("At least one stage is required.")]
    StagesEmpty,
    #[error("Invalid scenario '{value}'. Use smoke, load, stress, or demo.")]
    InvalidScenario { value: String },
    #[error("Invalid account source '{value}'. Use synthetic or admin.")]
    InvalidAccountSource { value: String },
    #[error("Unknown threshold metric '{metric}'. Use http_req_duration, http_req_failed or checks.")]
    UnknownThresholdMetric { metric: String },
    #[error("Invalid threshold '{value}' for {metric}.")]
    InvalidThreshold { metric: String, value: String },
    #[error("Role bands out of order: student_end {student_end} > teacher_end {teacher_end}.")]
    RoleBandsOutOfOrder {
        student_end: usize,
        teacher_end: usize,
    },
    #[error("Invalid calendar month {month}. Use 1-12.")]
    InvalidCalendarMonth { month: u32 },
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Base URL '{url}' cannot carry a path base.")]
    BaseUrlNotABase { url: String },
    #[error("Role '{role}' borrows passwords from '{lender}', which is not listed before it.")]
    UnknownPasswordLender { role: String, lender: String },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
