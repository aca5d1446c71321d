//! Error taxonomy (spec §7): validation / scene / worker, aggregated into
//! one `RenderError` returned by the fallible parts of the API.

use thiserror::Error;

/// One violated invariant from the data model (spec §3) or the registration
/// rules (spec §4.6).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("scalar {field} = {value} is out of range {low}..={high}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
    #[error("colour channel {field} = {value} is out of range [0,1]")]
    ChannelOutOfRange { field: &'static str, value: f64 },
    #[error("{field} must be a non-zero vector")]
    ZeroVector { field: &'static str },
    #[error("screen_north is not orthogonal to cam_to_screen (|dot| = {dot}, tolerance 5e-6)")]
    NonOrthogonalScreenVectors { dot: f64 },
    #[error("radius must be > 0, got {0}")]
    NonPositiveRadius(f64),
    #[error("resolution must have height > 0 and width > 0, got {height}x{width}")]
    NonPositiveResolution { height: u32, width: u32 },
    #[error("name {0:?} is already registered")]
    DuplicateName(String),
    #[error("name {0:?} is not registered")]
    UnknownName(String),
    #[error("cannot replace {0:?} with an entity of a different kind")]
    EntityKindMismatch(String),
    #[error("name {0:?} is reserved for the camera or the light")]
    ReservedName(String),
    #[error("a sphere's name cannot be empty")]
    EmptyName,
    #[error("new camera resolution {new_height}x{new_width} does not match the scene's established resolution {established_height}x{established_width}")]
    ResolutionMismatch {
        established_height: u32,
        established_width: u32,
        new_height: u32,
        new_width: u32,
    },
}

/// A capture-time failure (spec §4.6's "Capture-time validation").
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Camera is not defined")]
    MissingCamera,
    #[error("Light is not defined")]
    MissingLight,
    #[error("No objects to render")]
    NoSpheres,
    #[error("too many spheres registered: {0} exceeds the 512-slot limit")]
    TooManySpheres(usize),
}

/// A staging worker failed while building a device-ready buffer (spec §5,
/// §4.7's staging model).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("staging worker for {phase} panicked: {message}")]
pub struct WorkerError {
    pub phase: &'static str,
    pub message: String,
}

/// All issues found during one validation pass, concatenated per spec §6's
/// "multi-line message concatenating all issues".
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

/// All issues found during one capture-time validation pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct SceneErrors(pub Vec<SceneError>);

impl std::fmt::Display for SceneErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

/// The error type returned by every fallible call in the public API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    Scene(#[from] SceneErrors),
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

impl From<ValidationError> for RenderError {
    fn from(e: ValidationError) -> Self {
        RenderError::Validation(ValidationErrors(vec![e]))
    }
}

impl From<SceneError> for RenderError {
    fn from(e: SceneError) -> Self {
        RenderError::Scene(SceneErrors(vec![e]))
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
