use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("section {section} has no fixed speed and the track has no friction config")]
    MissingFriction { section: usize },
    #[error("section {section}: {what} must be positive and finite, got {value}")]
    InvalidSection {
        section: usize,
        what: &'static str,
        value: f64,
    },
    #[error("section {section} needs {steps} points, at most {max} are allowed")]
    SectionTooLong {
        section: usize,
        steps: usize,
        max: usize,
    },
    #[error("anchor velocity must be positive and finite, got {0}")]
    InvalidAnchor(f64),
    #[error("config {what} must be finite, got {value}")]
    InvalidConfig { what: &'static str, value: f64 },
    #[error(transparent)]
    Persist(#[from] persist::PersistError),
    #[error("export interval must be positive and finite, got {0}")]
    InvalidInterval(f64),
    #[error("failed to write NL2Elem: {0}")]
    Xml(#[from] quick_xml::DeError),
}

pub type Result<T> = std::result::Result<T, TrackError>;
