//! Creative concepts: stylistic modifiers whose prompt snippet is appended to a shot's
//! subject. Categories only group concepts for display.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConceptCategory {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreativeConcept {
    pub id: &'static str,
    pub title: &'static str,
    /// Display-only.
    pub psychological_effect: &'static str,
    /// Text injected into the shot subject.
    pub prompt_snippet: &'static str,
    pub category: &'static str,
}

static CATEGORIES: &[ConceptCategory] = &[
    ConceptCategory {
        id: "curiosity_mystery",
        title: "Curiosity & Mystery",
        description: "Shots designed to make the viewer ask 'what am I seeing?'",
    },
    ConceptCategory {
        id: "anxiety_tension",
        title: "Anxiety & Tension",
        description: "Shots designed to make the viewer feel uneasy or threatened.",
    },
    ConceptCategory {
        id: "awe_surrealism",
        title: "Awe & Surrealism",
        description: "Shots that break the rules of reality to create a sense of wonder.",
    },
    ConceptCategory {
        id: "focus_intimacy",
        title: "Focus & Intimacy",
        description: "Shots that force extreme closeness or attention to a specific detail.",
    },
    ConceptCategory {
        id: "satire_anachronism",
        title: "Satire & Anachronism",
        description: "Shots that intentionally break historical accuracy for comedic or satirical effect.",
    },
];

static CONCEPTS: &[CreativeConcept] = &[
    CreativeConcept {
        id: "object_pov",
        title: "Object-Embedded POV (منظور الجماد)",
        psychological_effect: "Confusion and strangeness. \"Why am I seeing the world from inside a skull?\"",
        prompt_snippet: "POV shot from the perspective of an inanimate object, looking out from inside a hollow skull's eye socket.",
        category: "curiosity_mystery",
    },
    CreativeConcept {
        id: "natural_framing",
        title: "Natural Framing (الإطار الطبيعي)",
        psychological_effect: "A sense of voyeurism or a hidden glimpse into a scene.",
        prompt_snippet: "Extreme natural framing, view is significantly obscured by foreground elements (e.g., leaves, a crack in a wall, between two closely packed items), creating a narrow window onto the main subject.",
        category: "curiosity_mystery",
    },
    CreativeConcept {
        id: "claustrophobic_shot",
        title: "Claustrophobic Shot (اللقطة الخانقة)",
        psychological_effect: "Discomfort and a feeling of being trapped or overwhelmed.",
        prompt_snippet: "Extreme close-up, oppressively tight framing, subject fills the entire frame with very little to no negative space, invading personal space.",
        category: "anxiety_tension",
    },
    CreativeConcept {
        id: "vertigo_swirl",
        title: "Vertigo Swirl (دوّامة الدوار)",
        psychological_effect: "Dizziness, disorientation, and a sense of unease or impending doom.",
        prompt_snippet: "Dutch angle combined with a swirling, distorted perspective, as if looking through a warped lens or experiencing a dizzy spell, background elements curve and spiral.",
        category: "anxiety_tension",
    },
    CreativeConcept {
        id: "impossible_camera",
        title: "Impossible Camera (كاميرا مستحيلة)",
        psychological_effect: "Surprise and a delightful break from reality, making the viewer question the scene's logic.",
        prompt_snippet: "Impossible camera placement, shot from a physically unattainable viewpoint, such as from inside a solid object looking out, or a camera path that defies physics.",
        category: "awe_surrealism",
    },
    CreativeConcept {
        id: "impossible_scale",
        title: "Impossible Scale (تلاعب بالمقياس)",
        psychological_effect: "Wonder, dreamlike quality, and a shift in perceived importance or power.",
        prompt_snippet: "Surreal juxtaposition of vastly different scales, e.g., a miniature person standing on a normal-sized book, or a giant teacup in a landscape. Subject's scale is unexpectedly and illogically altered relative to their environment.",
        category: "awe_surrealism",
    },
    CreativeConcept {
        id: "tunnel_focus",
        title: "Tunnel Focus (التركيز النَفَقي)",
        psychological_effect: "Intense focus on a specific detail, creating a sense of heightened importance or obsession.",
        prompt_snippet: "Extreme tunnel vision effect, heavy vignetting with sharp focus only on a very small central detail, rest of the image is dark and blurred.",
        category: "focus_intimacy",
    },
    CreativeConcept {
        id: "intimate_whisper",
        title: "The Intimate Whisper (همس الكاميرا)",
        psychological_effect: "Extreme closeness and a sense of shared secrets or private thoughts.",
        prompt_snippet: "Macro shot of a tiny detail on the subject (e.g., a single bead of sweat, the texture of fabric, a whisper from lips), camera is uncomfortably close, almost touching.",
        category: "focus_intimacy",
    },
    CreativeConcept {
        id: "ancient_selfie",
        title: "Ancient Selfie (سيلفي الأجداد)",
        psychological_effect: "Humor, irony, and a playful comment on modern obsessions.",
        prompt_snippet: "Subject in historical attire taking a selfie with an anachronistic smartphone, posing with a typical selfie expression.",
        category: "satire_anachronism",
    },
    CreativeConcept {
        id: "tourist_from_future",
        title: "Tourist from the Future (سائح من المستقبل)",
        psychological_effect: "Amusement, curiosity, and a gentle critique of tourism or cultural insensitivity.",
        prompt_snippet: "A person in modern tourist clothing (Hawaiian shirt, baseball cap, camera) incongruously observing or interacting with a historical scene, looking out of place.",
        category: "satire_anachronism",
    },
    CreativeConcept {
        id: "plastic_waste",
        title: "Plastic Waste (نفايات بلاستيكية)",
        psychological_effect: "Sobering irony, ecological commentary, and a jarring anachronism.",
        prompt_snippet: "Anachronistic plastic waste (e.g., plastic bottles, shopping bags) visibly littered within an otherwise pristine historical setting.",
        category: "satire_anachronism",
    },
    CreativeConcept {
        id: "graffiti_on_ruins",
        title: "Graffiti on the Ruins (جرافيتي على الآثار)",
        psychological_effect: "Critique of vandalism, cultural commentary, or a surprising blend of old and new art forms.",
        prompt_snippet: "Modern spray-paint graffiti anachronistically adorning ancient ruins or historical architecture.",
        category: "satire_anachronism",
    },
];

/// Lookup surface over a static concept table.
#[derive(Debug, Clone, Copy)]
pub struct ConceptRegistry {
    categories: &'static [ConceptCategory],
    concepts: &'static [CreativeConcept],
}

impl Default for ConceptRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ConceptRegistry {
    pub const fn builtin() -> Self {
        Self {
            categories: CATEGORIES,
            concepts: CONCEPTS,
        }
    }

    pub const fn new(
        categories: &'static [ConceptCategory],
        concepts: &'static [CreativeConcept],
    ) -> Self {
        Self {
            categories,
            concepts,
        }
    }

    pub fn categories(&self) -> &'static [ConceptCategory] {
        self.categories
    }

    pub fn concepts(&self) -> &'static [CreativeConcept] {
        self.concepts
    }

    pub fn find_concept(&self, id: &str) -> Option<&'static CreativeConcept> {
        self.concepts.iter().find(|concept| concept.id == id)
    }

    pub fn find_category(&self, id: &str) -> Option<&'static ConceptCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn concepts_in_category<'s>(
        &'s self,
        category: &'s str,
    ) -> impl Iterator<Item = &'static CreativeConcept> + 's {
        self.concepts
            .iter()
            .filter(move |concept| concept.category == category)
    }
}

pub fn find_concept(id: &str) -> Option<&'static CreativeConcept> {
    ConceptRegistry::builtin().find_concept(id)
}
