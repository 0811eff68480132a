use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Workbook generation failed: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown dormitory: {dorm_id}")]
    UnknownDormitory { dorm_id: u32 },

    #[error("Room {room} does not exist in dormitory {dorm_id}")]
    UnknownRoom { dorm_id: u32, room: u32 },

    #[error("Room {room} in dormitory {dorm_id} is full")]
    RoomFull { dorm_id: u32, room: u32 },

    #[error("Student '{name}' is already assigned to room {room} of {dormitory}")]
    DuplicateStudent {
        name: String,
        dormitory: String,
        room: u32,
    },

    #[error("Required field is missing: {field}")]
    MissingField { field: String },

    #[error("Course must be between 1 and 4, got {course}")]
    InvalidCourse { course: u8 },

    #[error("Text generation service error (status {status:?}): {message}")]
    ServiceError { status: Option<u16>, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Roster,
    Lookup,
    Input,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::ConfigError { .. }
            | DashboardError::ConfigValidationError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DashboardError::HttpError(_) | DashboardError::ServiceError { .. } => {
                ErrorCategory::Network
            }
            DashboardError::RoomFull { .. } | DashboardError::DuplicateStudent { .. } => {
                ErrorCategory::Roster
            }
            DashboardError::UnknownDormitory { .. } | DashboardError::UnknownRoom { .. } => {
                ErrorCategory::Lookup
            }
            DashboardError::MissingField { .. } | DashboardError::InvalidCourse { .. } => {
                ErrorCategory::Input
            }
            DashboardError::CsvError(_)
            | DashboardError::SerializationError(_)
            | DashboardError::ImageError(_)
            | DashboardError::Base64Error(_)
            | DashboardError::XlsxError(_)
            | DashboardError::ProcessingError { .. }
            | DashboardError::ValidationError { .. } => ErrorCategory::Data,
            DashboardError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Roster => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Lookup | ErrorCategory::Input => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Message shown to the operator, in the dashboard's language.
    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::RoomFull { .. } => "Xona to'la!".to_string(),
            DashboardError::DuplicateStudent {
                name, room, ..
            } => format!(
                "Bu talaba mavjud! \"{}\" allaqachon {}-xonaga biriktirilgan.",
                name, room
            ),
            DashboardError::MissingField { .. } | DashboardError::InvalidCourse { .. } => {
                "Iltimos, barcha maydonlarni to'ldiring.".to_string()
            }
            DashboardError::UnknownDormitory { dorm_id } => {
                format!("{}-yotoqxona topilmadi.", dorm_id)
            }
            DashboardError::UnknownRoom { room, .. } => format!("{}-xona topilmadi.", room),
            DashboardError::XlsxError(_) | DashboardError::CsvError(_) => {
                "Excel fayl yaratishda xatolik yuz berdi. Konsolni tekshiring.".to_string()
            }
            DashboardError::HttpError(_) | DashboardError::ServiceError { .. } => {
                "Kechirasiz, tizimda vaqtinchalik nosozlik. Internet aloqasini tekshiring."
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration file and command-line arguments"
            }
            ErrorCategory::Network => "Check connectivity and API credentials, then retry",
            ErrorCategory::Roster => "Pick another room or student and try again",
            ErrorCategory::Lookup => "Run `rooms` to list the dormitories and rooms that exist",
            ErrorCategory::Input => "Fill in every field and keep the course between 1 and 4",
            ErrorCategory::Data => "Inspect the input data for malformed values",
            ErrorCategory::System => "Check disk space and permissions of the output path",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_errors_are_low_severity() {
        let err = DashboardError::RoomFull { dorm_id: 1, room: 3 };
        assert_eq!(err.category(), ErrorCategory::Roster);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.user_friendly_message(), "Xona to'la!");
    }

    #[test]
    fn test_duplicate_message_names_room() {
        let err = DashboardError::DuplicateStudent {
            name: "Karimov Aziz".to_string(),
            dormitory: "1-Talabalar turar joyi".to_string(),
            room: 12,
        };
        assert!(err.user_friendly_message().contains("12-xonaga"));
    }

    #[test]
    fn test_lookup_and_input_errors_fail_the_command() {
        let cases = vec![
            (DashboardError::RoomFull { dorm_id: 1, room: 3 }, ErrorSeverity::Low),
            (
                DashboardError::DuplicateStudent {
                    name: "Karimov Aziz".to_string(),
                    dormitory: "1-Talabalar turar joyi".to_string(),
                    room: 2,
                },
                ErrorSeverity::Low,
            ),
            (DashboardError::UnknownDormitory { dorm_id: 9 }, ErrorSeverity::Medium),
            (DashboardError::UnknownRoom { dorm_id: 1, room: 99 }, ErrorSeverity::Medium),
            (
                DashboardError::MissingField {
                    field: "group".to_string(),
                },
                ErrorSeverity::Medium,
            ),
            (DashboardError::InvalidCourse { course: 7 }, ErrorSeverity::Medium),
        ];
        for (err, expected) in cases {
            assert_eq!(err.severity(), expected, "{}", err);
        }

        assert_eq!(
            DashboardError::UnknownRoom { dorm_id: 1, room: 99 }.category(),
            ErrorCategory::Lookup
        );
        assert_eq!(DashboardError::InvalidCourse { course: 0 }.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_workbook_errors_use_export_message() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let err = DashboardError::from(workbook.add_worksheet().set_name("").err().unwrap());
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().starts_with("Excel fayl"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = DashboardError::IoError(std::io::Error::other("disk"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
