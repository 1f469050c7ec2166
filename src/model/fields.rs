use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Every configurable attribute a scene or shot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    AspectRatio,
    Era,
    Location,
    TimeOfDay,
    KeyElements,
    Mood,
    Lighting,
    Weather,
    Palette,
    ArtisticStyle,
    Inspiration,
    NegativePrompt,
    Subject,
    CameraAngle,
    Lens,
    Aperture,
    Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    Scene,
    Shot,
}

impl FieldId {
    pub const ALL: [FieldId; 17] = [
        FieldId::AspectRatio,
        FieldId::Era,
        FieldId::Location,
        FieldId::TimeOfDay,
        FieldId::KeyElements,
        FieldId::Mood,
        FieldId::Lighting,
        FieldId::Weather,
        FieldId::Palette,
        FieldId::ArtisticStyle,
        FieldId::Inspiration,
        FieldId::NegativePrompt,
        FieldId::Subject,
        FieldId::CameraAngle,
        FieldId::Lens,
        FieldId::Aperture,
        FieldId::Details,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::AspectRatio => "aspectRatio",
            FieldId::Era => "era",
            FieldId::Location => "location",
            FieldId::TimeOfDay => "timeOfDay",
            FieldId::KeyElements => "keyElements",
            FieldId::Mood => "mood",
            FieldId::Lighting => "lighting",
            FieldId::Weather => "weather",
            FieldId::Palette => "palette",
            FieldId::ArtisticStyle => "artisticStyle",
            FieldId::Inspiration => "inspiration",
            FieldId::NegativePrompt => "negativePrompt",
            FieldId::Subject => "subject",
            FieldId::CameraAngle => "cameraAngle",
            FieldId::Lens => "lens",
            FieldId::Aperture => "aperture",
            FieldId::Details => "details",
        }
    }

    /// Accepts the camelCase identifier; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|id| id.as_str() == trimmed)
    }

    pub fn scope(&self) -> FieldScope {
        match self {
            FieldId::Subject
            | FieldId::CameraAngle
            | FieldId::Lens
            | FieldId::Aperture
            | FieldId::Details => FieldScope::Shot,
            _ => FieldScope::Scene,
        }
    }

    /// Fields that draw from an option list (static catalog plus custom entries).
    pub fn is_option_bearing(&self) -> bool {
        !matches!(
            self,
            FieldId::Inspiration | FieldId::NegativePrompt | FieldId::Subject | FieldId::Details
        )
    }

    pub fn descriptor(&self) -> &'static FieldDescriptor {
        SCENE_DNA_GROUPS
            .iter()
            .chain(SHOT_GROUPS.iter())
            .flat_map(|group| group.fields.iter())
            .find(|field| field.id == *self)
            .expect("every field id has a descriptor")
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Select,
    MultiSelect,
    Text,
    TextArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multiple,
}

impl FieldKind {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            FieldKind::Select => Cardinality::Single,
            FieldKind::MultiSelect | FieldKind::Text | FieldKind::TextArea => Cardinality::Multiple,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Text(&'static str),
    List(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Option set the field draws from, if any.
    pub options: Option<FieldId>,
    pub allow_custom: bool,
    pub default: FieldDefault,
    pub placeholder: &'static str,
}

impl FieldDescriptor {
    pub fn cardinality(&self) -> Cardinality {
        self.kind.cardinality()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
    pub id: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldDescriptor],
}

const fn select(
    id: FieldId,
    label: &'static str,
    default: &'static str,
    allow_custom: bool,
    placeholder: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        id,
        label,
        kind: FieldKind::Select,
        options: Some(id),
        allow_custom,
        default: FieldDefault::Text(default),
        placeholder,
    }
}

const fn list(
    id: FieldId,
    label: &'static str,
    kind: FieldKind,
    placeholder: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        id,
        label,
        kind,
        options: None,
        allow_custom: false,
        default: FieldDefault::List(&[]),
        placeholder,
    }
}

pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

pub static SCENE_DNA_GROUPS: &[FieldGroup] = &[
    FieldGroup {
        id: "sceneMeta",
        title: "Scene Identity & Configuration",
        fields: &[select(
            FieldId::AspectRatio,
            "Aspect Ratio",
            DEFAULT_ASPECT_RATIO,
            false,
            "Select aspect ratio for all shots",
        )],
    },
    FieldGroup {
        id: "sceneFoundation",
        title: "Scene DNA: Foundation",
        fields: &[
            select(
                FieldId::Era,
                "Historical Era/Period",
                "",
                true,
                "Select or type custom era...",
            ),
            select(
                FieldId::Location,
                "Location/Setting",
                "",
                true,
                "Select or type custom location...",
            ),
            select(
                FieldId::TimeOfDay,
                "Time of Day",
                "",
                true,
                "Select or type custom time...",
            ),
        ],
    },
    FieldGroup {
        id: "sceneKeyElements",
        title: "Key Scene Elements",
        fields: &[FieldDescriptor {
            id: FieldId::KeyElements,
            label: "Select Key Elements",
            kind: FieldKind::MultiSelect,
            options: Some(FieldId::KeyElements),
            allow_custom: false,
            default: FieldDefault::List(&[]),
            placeholder: "Add elements relevant to the scene era...",
        }],
    },
    FieldGroup {
        id: "sceneAtmosphere",
        title: "Scene DNA: Atmosphere",
        fields: &[
            select(
                FieldId::Mood,
                "Overall Mood",
                "",
                true,
                "Select or type custom mood...",
            ),
            select(
                FieldId::Lighting,
                "Lighting Style",
                "",
                true,
                "Select or type custom lighting...",
            ),
            select(
                FieldId::Weather,
                "Weather Conditions",
                "",
                true,
                "e.g., light rain, clear sky (can be custom)",
            ),
            select(
                FieldId::Palette,
                "Color Palette",
                "",
                true,
                "Select or type custom palette...",
            ),
        ],
    },
    FieldGroup {
        id: "sceneArtistry",
        title: "Scene DNA: Artistry & Tone",
        fields: &[
            select(
                FieldId::ArtisticStyle,
                "Artistic Style/Medium",
                "",
                true,
                "Select or type custom style...",
            ),
            list(
                FieldId::Inspiration,
                "Inspirations (Artists/Works)",
                FieldKind::Text,
                "e.g., inspired by Rembrandt, style of Akira Kurosawa",
            ),
            list(
                FieldId::NegativePrompt,
                "Negative Prompts (Scene Level)",
                FieldKind::Text,
                "e.g., modern elements, text, watermark",
            ),
        ],
    },
];

pub static SHOT_GROUPS: &[FieldGroup] = &[FieldGroup {
    id: "shotComposition",
    title: "Shot Composition",
    fields: &[
        list(
            FieldId::Subject,
            "Main Subject(s) / Action",
            FieldKind::TextArea,
            "e.g., A merchant presents a rare spice to a scholar. Two warriors clash swords.",
        ),
        select(
            FieldId::CameraAngle,
            "Camera Angle/View",
            "",
            true,
            "Select or type custom angle...",
        ),
        select(
            FieldId::Lens,
            "Lens Type/Focal Length",
            "",
            true,
            "Select or type custom lens...",
        ),
        select(
            FieldId::Aperture,
            "Aperture/Depth of Field",
            "",
            true,
            "Select or type custom aperture...",
        ),
        list(
            FieldId::Details,
            "Specific Details/Objects (Shot Level)",
            FieldKind::TextArea,
            "e.g., a specific expression, an object in hand, foreground elements",
        ),
    ],
}];

/// Iterates the descriptors of `groups` in declaration order.
pub fn fields_of(groups: &[FieldGroup]) -> impl Iterator<Item = &FieldDescriptor> {
    groups.iter().flat_map(|group| group.fields.iter())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("field '{0}' is declared more than once")]
    DuplicateField(FieldId),
    #[error("field '{field}' references '{options}', which has no option set")]
    InvalidOptionsRef { field: FieldId, options: FieldId },
    #[error("field '{0}' declares a default that does not match its cardinality")]
    DefaultCardinality(FieldId),
    #[error("field '{field}' is placed in a {expected:?} group")]
    WrongScope { field: FieldId, expected: FieldScope },
}

/// Checks a group layout once, at configuration load.
pub fn validate_layout(groups: &[FieldGroup], scope: FieldScope) -> Result<(), LayoutError> {
    let mut seen = BTreeSet::new();
    for field in fields_of(groups) {
        if !seen.insert(field.id) {
            return Err(LayoutError::DuplicateField(field.id));
        }
        if field.id.scope() != scope {
            return Err(LayoutError::WrongScope {
                field: field.id,
                expected: scope,
            });
        }
        if let Some(options) = field.options {
            if !options.is_option_bearing() {
                return Err(LayoutError::InvalidOptionsRef {
                    field: field.id,
                    options,
                });
            }
        }
        let default_matches = matches!(
            (field.cardinality(), field.default),
            (Cardinality::Single, FieldDefault::Text(_))
                | (Cardinality::Multiple, FieldDefault::List(_))
        );
        if !default_matches {
            return Err(LayoutError::DefaultCardinality(field.id));
        }
    }
    Ok(())
}

pub fn validate_layouts(
    scene_groups: &[FieldGroup],
    shot_groups: &[FieldGroup],
) -> Result<(), LayoutError> {
    validate_layout(scene_groups, FieldScope::Scene)?;
    validate_layout(shot_groups, FieldScope::Shot)
}
