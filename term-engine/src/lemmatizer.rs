//! Rule-based English lemmatizer.
//!
//! An irregular-form table handles the common exceptions; plural nouns and
//! `-ing`/`-ed` verb forms are reduced by suffix rules. Words that merely look
//! inflected ("during", "news", "hundred") are protected. Input is expected
//! lowercase.

use std::collections::{HashMap, HashSet};

const IRREGULAR: &[(&str, &str)] = &[
    // be / have / do
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("doing", "do"),
    // irregular verbs
    ("went", "go"),
    ("gone", "go"),
    ("goes", "go"),
    ("going", "go"),
    ("made", "make"),
    ("said", "say"),
    ("says", "say"),
    ("took", "take"),
    ("taken", "take"),
    ("came", "come"),
    ("saw", "see"),
    ("seen", "see"),
    ("knew", "know"),
    ("known", "know"),
    ("got", "get"),
    ("gotten", "get"),
    ("gave", "give"),
    ("given", "give"),
    ("found", "find"),
    ("thought", "think"),
    ("told", "tell"),
    ("became", "become"),
    ("felt", "feel"),
    ("brought", "bring"),
    ("began", "begin"),
    ("begun", "begin"),
    ("kept", "keep"),
    ("held", "hold"),
    ("wrote", "write"),
    ("written", "write"),
    ("stood", "stand"),
    ("heard", "hear"),
    ("meant", "mean"),
    ("ran", "run"),
    ("paid", "pay"),
    ("sent", "send"),
    ("built", "build"),
    ("spent", "spend"),
    ("won", "win"),
    ("lost", "lose"),
    ("bought", "buy"),
    ("caught", "catch"),
    ("taught", "teach"),
    ("sold", "sell"),
    ("fell", "fall"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("broke", "break"),
    ("broken", "break"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("wore", "wear"),
    ("worn", "wear"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("threw", "throw"),
    ("thrown", "throw"),
    ("used", "use"),
    ("using", "use"),
    ("created", "create"),
    ("creating", "create"),
    ("agreed", "agree"),
    // adjectives
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
    // irregular nouns
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("wolves", "wolf"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("heroes", "hero"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
];

/// Words ending in -s, -ing or -ed that are already base forms.
const PROTECTED: &[&str] = &[
    "always", "perhaps", "news", "series", "species", "physics", "politics", "economics",
    "mathematics", "ethics", "lens", "gas", "bus", "yes", "this", "thus", "plus", "during",
    "morning", "evening", "nothing", "something", "anything", "everything", "thing", "king",
    "ring", "spring", "string", "wing", "ceiling", "wedding", "pudding", "bring", "sing",
    "swing", "sibling", "viking", "hundred", "indeed", "speed", "seed", "need", "feed", "bleed",
    "breed", "greed", "naked", "wicked", "sacred", "kindred", "beloved", "red", "bed", "shed",
];

/// Nouns ending in -ie whose plural would otherwise fall to the -ies -> -y rule.
const IE_NOUNS: &[&str] = &[
    "movie", "cookie", "zombie", "rookie", "hoodie", "selfie", "smoothie", "brownie", "calorie",
    "goalie", "newbie", "freebie", "hippie", "junkie", "genie", "beanie", "auntie", "bestie",
    "cutie", "sweetie", "foodie", "techie", "indie", "veggie", "prairie", "pixie", "collie",
    "birdie", "groupie", "magpie", "walkie", "talkie", "sortie", "lassie", "boogie", "budgie",
];

/// Endings of nouns in -oe that take a plain -s plural.
const OE_NOUNS: &[&str] = &["shoe", "toe", "canoe", "oboe", "foe", "hoe", "floe", "sloe"];

/// Nouns already ending in -s whose plural adds -es.
const S_NOUNS: &[&str] = &[
    "bus", "gas", "lens", "bias", "alias", "atlas", "canvas", "bonus", "virus", "campus",
    "status", "census", "chorus", "circus", "focus", "genius", "iris", "plus", "minus",
    "octopus", "cactus", "walrus", "fetus", "sinus", "apparatus", "prospectus", "syllabus",
];

#[derive(Debug, Clone)]
pub struct Lemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    protected: HashSet<&'static str>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self {
            irregular: IRREGULAR.iter().copied().collect(),
            protected: PROTECTED.iter().copied().collect(),
        }
    }

    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = self.irregular.get(word) {
            return (*lemma).to_string();
        }
        if word.chars().count() <= 3 || self.protected.contains(word) || !word.is_ascii() {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ing") {
            if word.len() >= 6 && has_vowel(stem) {
                return restore_verb_stem(stem);
            }
            return word.to_string();
        }

        if word.ends_with("eed") {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ied") {
            if word.len() > 4 {
                return format!("{stem}y");
            }
        }
        if let Some(stem) = word.strip_suffix("ed") {
            if word.len() >= 5 && has_vowel(stem) {
                return restore_verb_stem(stem);
            }
            return word.to_string();
        }

        singularize(word)
    }
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if word.len() > 4 {
            let ie = format!("{stem}ie");
            if IE_NOUNS.contains(&ie.as_str()) {
                return ie;
            }
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("oes") {
        let oe = &word[..word.len() - 1];
        if OE_NOUNS.iter().any(|noun| oe.ends_with(noun)) {
            return oe.to_string();
        }
        return format!("{stem}o");
    }
    if let Some(stem) = word.strip_suffix("es") {
        if S_NOUNS.contains(&stem) {
            return stem.to_string();
        }
    }
    if word.ends_with("sses")
        || word.ends_with("xes")
        || word.ends_with("ches")
        || word.ends_with("shes")
        || word.ends_with("zzes")
    {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

/// Undo consonant doubling or restore a dropped `e` after stripping -ing/-ed.
fn restore_verb_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    let last = chars[n - 1];

    // running -> runn -> run, but falling -> fall, missing -> miss
    if n >= 3 && last == chars[n - 2] && is_consonant(last) && !matches!(last, 'l' | 's' | 'z' | 'f')
    {
        return chars[..n - 1].iter().collect();
    }

    if needs_final_e(&chars) {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn needs_final_e(chars: &[char]) -> bool {
    let n = chars.len();
    let last = chars[n - 1];
    if matches!(last, 'w' | 'x' | 'y') || !is_consonant(last) {
        return false;
    }
    // driving -> drive, producing -> produce
    if matches!(last, 'v' | 'c') {
        return true;
    }
    // organizing -> organize, analyzing -> analyze
    if n >= 3 && last == 'z' && matches!(chars[n - 2], 'i' | 'y') {
        return true;
    }
    let cvc = |c: &[char]| is_consonant(c[0]) && !is_consonant(c[1]) && is_consonant(c[2]);
    // making -> make, voting -> vote
    if n == 3 {
        return cvc(chars);
    }
    // writing -> write, sharing -> share; opening and visiting stay
    if n == 4 {
        return is_consonant(chars[0]) && cvc(&chars[1..]);
    }
    false
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
}
