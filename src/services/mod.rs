pub mod artifact_sink;
pub mod classifier;
pub mod concepts;
pub mod expression;
pub mod math_terms;
pub mod narration;
pub mod page_script;
pub mod phrases;
pub mod sanitizer;
pub mod scene;
pub mod step_extractor;
pub mod subtitle;

pub use artifact_sink::{ArtifactSink, DiskSink};
pub use classifier::Classifier;
pub use concepts::ConceptExtractor;
pub use expression::ExpressionExtractor;
pub use narration::NarrationBuilder;
pub use page_script::PageScriptBuilder;
pub use sanitizer::ContentSanitizer;
pub use scene::SceneCompiler;
pub use step_extractor::StepExtractor;
pub use subtitle::SubtitleBuilder;
