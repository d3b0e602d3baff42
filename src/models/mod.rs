pub mod bundle;
pub mod classification;
pub mod language;
pub mod loaders;
pub mod narration;
pub mod page;
pub mod problem;
pub mod scene;
pub mod step;
pub mod subtitle;

pub use bundle::{CompilationBundle, DurationReport, RenderRequest, RenderResult, SpeechRequest};
pub use classification::{Category, Classification, Complexity, PresentationFormat};
pub use language::Language;
pub use loaders::{load_all_problems, load_problem};
pub use narration::NarrationTranscript;
pub use page::{Page, PageKind};
pub use problem::{validate_problem_id, ProblemInput};
pub use scene::{SceneProgram, SceneStrategy};
pub use step::{ExtractionSource, ExtractionTier, Step, SENTINEL_BODY};
pub use subtitle::{SubtitleCue, SubtitleTrack};
