pub mod fields;
pub mod scene;
pub mod values;

pub use fields::{
    validate_layout, validate_layouts, Cardinality, FieldDescriptor, FieldGroup, FieldId,
    FieldKind, FieldScope, LayoutError, DEFAULT_ASPECT_RATIO, SCENE_DNA_GROUPS, SHOT_GROUPS,
};
pub use scene::{builtin_templates, Scene, SceneTemplate, Shot};
pub use values::{FieldValue, FieldValues, SceneDna, ShotData};
