//! 场景程序生成（瀑布布局 + 三种步骤策略 + 概念布局 + 最小程序兜底）

pub mod builders;
pub mod compiler;
pub mod emitter;
pub mod graphic;
pub mod layout;

pub use builders::{
    BuiltScene, ConceptLayoutBuilder, FullLayoutBuilder, SceneBuilder, SceneInput,
    SimplifiedLayoutBuilder, UltraSimplifiedLayoutBuilder,
};
pub use graphic::Graphic;
pub use compiler::{SceneCompiler, MINIMAL_SCENE_NAME};
pub use layout::{LayoutOp, WaterfallLayout};
