use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::model::FieldId;

/// A selectable value for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionEntry {
    pub label: String,
    /// Machine token; for key elements it is also the literal prompt text.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era_scope: Option<Vec<String>>,
}

impl OptionEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            era_scope: None,
        }
    }

    pub fn scoped<I, S>(label: impl Into<String>, value: impl Into<String>, eras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            value: value.into(),
            era_scope: Some(eras.into_iter().map(Into::into).collect()),
        }
    }

    /// An absent or empty scope is visible in every era.
    pub fn visible_in(&self, era: &str) -> bool {
        match &self.era_scope {
            None => true,
            Some(scope) if scope.is_empty() => true,
            Some(scope) => scope.iter().any(|scoped| scoped == era),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionCatalog {
    entries: BTreeMap<FieldId, Vec<OptionEntry>>,
}

static BUILTIN: LazyLock<OptionCatalog> = LazyLock::new(build_builtin);

impl OptionCatalog {
    pub fn builtin() -> &'static OptionCatalog {
        &BUILTIN
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (FieldId, Vec<OptionEntry>)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn options(&self, field: FieldId) -> &[OptionEntry] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_value(&self, field: FieldId, value: &str) -> bool {
        self.options(field).iter().any(|entry| entry.value == value)
    }
}

fn plain(items: &[(&str, &str)]) -> Vec<OptionEntry> {
    items
        .iter()
        .map(|(label, value)| OptionEntry::new(*label, *value))
        .collect()
}

fn build_builtin() -> OptionCatalog {
    OptionCatalog::from_entries([
        (
            FieldId::AspectRatio,
            plain(&[
                ("16:9 (Widescreen)", "16:9"),
                ("21:9 (Cinematic)", "21:9"),
                ("9:16 (Vertical)", "9:16"),
                ("1:1 (Square)", "1:1"),
                ("4:3 (Classic TV)", "4:3"),
                ("3:2 (Photography)", "3:2"),
            ]),
        ),
        (
            FieldId::Era,
            plain(&[
                ("— اختر الحقبة —", ""),
                ("Pre‑Islamic Arabia (Jāhilīyah)", "pre_islamic_arabia"),
                ("Prophetic Era (610‑632 CE)", "prophetic_era"),
                ("Rashidun Caliphate (632‑661 CE)", "rashidun_caliphate"),
                ("Umayyad Caliphate (661‑750 CE)", "umayyad_caliphate"),
                ("Abbasid Caliphate – Early Golden Age", "abbasid_caliphate"),
                ("Fatimid Caliphate (909‑1171 CE)", "fatimid_caliphate"),
                ("Al‑Andalus (Umayyad Spain)", "al_andalus"),
                ("Ayyubid & Crusader Period", "ayyubid_crusader"),
                ("Mamluk Sultanate", "mamluk_sultanate"),
                ("Edo Period Japan", "edo_japan"),
            ]),
        ),
        (
            FieldId::Location,
            vec![
                OptionEntry::new("— اختر المكان —", ""),
                OptionEntry::scoped(
                    "The Ancient Cube Shrine (Structure)",
                    "A massive, ancient, simple cuboid stone structure, without ornate calligraphy, covered in rough dark cloths, surrounded by primitive idols in a sandy courtyard",
                    ["pre_islamic_arabia"],
                ),
                OptionEntry::scoped(
                    "The House of Wisdom (Baghdad Structure)",
                    "A grand Abbasid complex with ornate archways and vast libraries filled with scrolls, bustling with scholars",
                    ["abbasid_caliphate"],
                ),
                OptionEntry::scoped(
                    "Dar al-Nadwa (Mecca's Parliament Structure)",
                    "A significant, simple stone building near the Kaaba courtyard, where tribal elders and leaders are gathered in serious discussion",
                    ["pre_islamic_arabia"],
                ),
                OptionEntry::scoped(
                    "Meccan Bazaar",
                    "mecca_bazaar",
                    ["pre_islamic_arabia", "prophetic_era"],
                ),
                OptionEntry::scoped(
                    "Kaaba Courtyard",
                    "kaaba_courtyard",
                    ["prophetic_era", "rashidun_caliphate"],
                ),
                OptionEntry::scoped(
                    "Medina Date‑Palm Grove",
                    "medina_palm_grove",
                    ["prophetic_era", "rashidun_caliphate"],
                ),
                OptionEntry::scoped(
                    "Damascus Grand Mosque",
                    "damascus_mosque",
                    ["umayyad_caliphate"],
                ),
                OptionEntry::scoped(
                    "Cairo Al‑Azhar Courtyard",
                    "al_azhar_cairo",
                    ["fatimid_caliphate", "mamluk_sultanate"],
                ),
                OptionEntry::scoped(
                    "Andalusian Patio (Cordoba)",
                    "cordoba_patio",
                    ["al_andalus"],
                ),
                OptionEntry::new("Desert Caravan Route", "desert_caravan"),
                OptionEntry::scoped(
                    "Serene Temple Garden (Japan)",
                    "serene_temple_garden",
                    ["edo_japan"],
                ),
            ],
        ),
        (
            FieldId::TimeOfDay,
            plain(&[
                ("Any Time", ""),
                ("Golden Hour (Sunrise/Sunset)", "golden_hour"),
                ("Midday (Bright Sun)", "midday_sun"),
                ("Twilight (Dusk/Dawn)", "twilight"),
                ("Night (Moonlit)", "night_moonlit"),
                ("Night (Dark)", "night_dark"),
                ("Overcast Afternoon", "overcast_afternoon"),
                ("Spring Morning", "spring_morning"),
            ]),
        ),
        (
            FieldId::Lighting,
            vec![
                OptionEntry::new("Any Lighting", ""),
                OptionEntry::new("Cinematic Lighting", "cinematic_lighting"),
                OptionEntry::new("Chiaroscuro (High Contrast)", "chiaroscuro"),
                OptionEntry::new("Soft Diffused Light", "soft_diffused_light"),
                OptionEntry::new("Rim Lighting", "rim_lighting"),
                OptionEntry::new("Volumetric Lighting", "volumetric_lighting"),
                OptionEntry::new("Natural Light", "natural_light"),
                OptionEntry::scoped(
                    "Single Oil‑Lamp Key",
                    "oil_lamp_key",
                    ["pre_islamic_arabia", "prophetic_era", "abbasid_caliphate"],
                ),
                OptionEntry::new("Low‑angle Sun Rim", "low_angle_sun_rim"),
                OptionEntry::scoped(
                    "Torch‑lit Courtyard",
                    "torch_courtyard",
                    ["umayyad_caliphate", "fatimid_caliphate"],
                ),
                OptionEntry::new("Soft Window Light", "soft_window_light"),
                OptionEntry::new("Volumetric Dust Shafts", "volumetric_shafts"),
            ],
        ),
        (
            FieldId::Mood,
            plain(&[
                ("Any Mood", ""),
                ("Mysterious", "mysterious"),
                ("Joyful & Celebratory", "joyful_celebratory"),
                ("Dramatic & Tense", "dramatic_tense"),
                ("Peaceful & Serene", "peaceful_serene"),
                ("Epic & Grandiose", "epic_grandiose"),
                ("Solemn / Spiritual", "solemn_spiritual"),
                ("Triumphant", "triumphant"),
                ("Reflective / Scholarly", "reflective_scholarly"),
                ("Bustling Market Energy", "bustling_market"),
                ("Battle Tension", "battle_tension"),
            ]),
        ),
        (
            FieldId::Weather,
            vec![
                OptionEntry::new("Any Weather", ""),
                OptionEntry::new("Clear Sky", "clear_sky"),
                OptionEntry::new("Light Rain", "light_rain"),
                OptionEntry::new("Misty / Foggy", "misty_foggy"),
                OptionEntry::scoped(
                    "Sandstorm",
                    "sandstorm",
                    ["pre_islamic_arabia", "abbasid_caliphate"],
                ),
                OptionEntry::new("Snowing Lightly", "snowing_lightly"),
                OptionEntry::new("Overcast Clouds", "overcast_clouds"),
                OptionEntry::scoped(
                    "Clear Sky, Cherry Blossoms Falling",
                    "clear_sky_cherry_blossoms_falling",
                    ["edo_japan"],
                ),
            ],
        ),
        (
            FieldId::Palette,
            vec![
                OptionEntry::new("Any Palette", ""),
                OptionEntry::scoped(
                    "Rich Jewel Tones",
                    "rich_jewel_tones",
                    ["abbasid_caliphate"],
                ),
                OptionEntry::new("Monochrome (Black & White)", "monochrome"),
                OptionEntry::new("Sepia Tone", "sepia_tone"),
                OptionEntry::new("Earthy Tones (Browns, Greens)", "earthy_tones"),
                OptionEntry::new("Vibrant & Saturated", "vibrant_saturated"),
                OptionEntry::new("Pastel Colors", "pastel_colors"),
                OptionEntry::new("Cool Blues & Grays", "cool_blues_grays"),
            ],
        ),
        (
            FieldId::CameraAngle,
            plain(&[
                ("Any Angle", ""),
                ("Eye-Level Shot", "eye_level"),
                ("Low-Angle Shot", "low_angle"),
                ("High-Angle Shot", "high_angle"),
                ("Aerial View (Bird's Eye)", "aerial_view"),
                ("Dutch Angle (Canted)", "dutch_angle"),
                ("Close-Up Shot", "close_up"),
                ("Wide Shot", "wide_shot"),
            ]),
        ),
        (
            FieldId::Lens,
            plain(&[
                ("Any Lens", ""),
                ("50mm Prime Lens (Standard)", "50mm_prime"),
                ("Wide-Angle Lens (e.g., 24mm)", "wide_angle_24mm"),
                ("Telephoto Lens (e.g., 200mm)", "telephoto_200mm"),
                ("Macro Lens (Extreme Close-up)", "macro_lens"),
                ("Fisheye Lens", "fisheye_lens"),
            ]),
        ),
        (
            FieldId::Aperture,
            plain(&[
                ("Any Aperture", ""),
                ("f/1.4 (Very Shallow Depth of Field)", "f_1_4_shallow"),
                ("f/2.8 (Shallow Depth of Field)", "f_2_8_shallow"),
                ("f/8.0 (Moderate Depth of Field)", "f_8_0_moderate"),
                ("f/16 (Deep Depth of Field)", "f_16_deep"),
            ]),
        ),
        (
            FieldId::ArtisticStyle,
            vec![
                OptionEntry::new("Any Style", ""),
                OptionEntry::new("Photorealistic", "photorealistic"),
                OptionEntry::new("Oil Painting (General)", "oil_painting"),
                OptionEntry::scoped(
                    "Orientalist Oil Painting",
                    "orientalist_oil_painting",
                    ["abbasid_caliphate", "mamluk_sultanate"],
                ),
                OptionEntry::scoped(
                    "Ukiyo-e Woodblock Print",
                    "ukiyo_e_woodblock",
                    ["edo_japan"],
                ),
                OptionEntry::new("Impressionistic", "impressionistic"),
                OptionEntry::new("Charcoal Sketch", "charcoal_sketch"),
                OptionEntry::new("Watercolor Painting", "watercolor_painting"),
                OptionEntry::new("Cinematic Film Still", "cinematic_film_still"),
            ],
        ),
        (FieldId::KeyElements, key_elements()),
    ])
}

fn key_elements() -> Vec<OptionEntry> {
    const JAHILIYYAH: [&str; 1] = ["pre_islamic_arabia"];
    vec![
        OptionEntry::new("— Add a Key Element —", ""),
        // Structures
        OptionEntry::scoped(
            "The Ancient Cube Shrine (Jahiliyyah Kaaba)",
            "A massive, ancient, simple cuboid stone structure, without ornate calligraphy, covered in rough dark cloths, surrounded by primitive idols in a sandy courtyard.",
            JAHILIYYAH,
        ),
        OptionEntry::scoped(
            "The House of Wisdom (Baghdad)",
            "A grand Abbasid complex with ornate archways and vast libraries filled with scrolls, bustling with scholars.",
            ["abbasid_caliphate"],
        ),
        OptionEntry::scoped(
            "Dar al-Nadwa (Mecca's Parliament)",
            "A significant, simple stone building near the Kaaba courtyard, where tribal elders and leaders are gathered in serious discussion.",
            JAHILIYYAH,
        ),
        // Characters
        OptionEntry::scoped(
            "Character: Hashim (Charismatic Leader)",
            "A handsome, charismatic, and respected middle-aged Quraysh leader with a confident and generous expression.",
            JAHILIYYAH,
        ),
        OptionEntry::scoped(
            "Character: Umayyah (Envious Nephew)",
            "A man with a face consumed by envy and bitterness, watching from the fringes of a crowd.",
            JAHILIYYAH,
        ),
        OptionEntry::scoped(
            "Character: Abd al-Muttalib (Venerable Elder)",
            "A venerable and wise old man with a serene and determined face, often depicted in a dream-like state or leading a great discovery.",
            JAHILIYYAH,
        ),
        OptionEntry::scoped(
            "Character: Qusayy ibn Kilab (The Founder)",
            "A powerful and sagacious elderly leader with an authoritative presence, seen making a fateful decision in a council of elders.",
            JAHILIYYAH,
        ),
        // Symbolic objects
        OptionEntry::scoped(
            "Object: Bowl of Perfume",
            "An ornate golden bowl filled with glistening, expensive perfume, emitting a fragrant haze.",
            JAHILIYYAH,
        ),
        OptionEntry::scoped(
            "Object: Bowl of Blood",
            "A rustic clay vessel filled with dark, sacrificial blood, used in a grim oath-swearing ritual.",
            JAHILIYYAH,
        ),
        OptionEntry::scoped(
            "Object: The Keys of the Kaaba",
            "An ornate, heavy, antique iron key, a symbol of great honor and responsibility.",
            ["pre_islamic_arabia", "prophetic_era", "rashidun_caliphate"],
        ),
        OptionEntry::scoped(
            "Detail: Idols around the Shrine",
            "Various small and large pagan idols and statues are arranged around the central cube shrine.",
            JAHILIYYAH,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_option_bearing_field() {
        let catalog = OptionCatalog::builtin();
        for field in FieldId::ALL {
            assert_eq!(
                !catalog.options(field).is_empty(),
                field.is_option_bearing(),
                "{field}"
            );
        }
    }

    #[test]
    fn scope_visibility() {
        let global = OptionEntry::new("Clear Sky", "clear_sky");
        let empty = OptionEntry::scoped("Empty", "empty", Vec::<String>::new());
        let edo = OptionEntry::scoped("Garden", "garden", ["edo_japan"]);
        assert!(global.visible_in("edo_japan"));
        assert!(empty.visible_in("abbasid_caliphate"));
        assert!(edo.visible_in("edo_japan"));
        assert!(!edo.visible_in("abbasid_caliphate"));
    }
}
