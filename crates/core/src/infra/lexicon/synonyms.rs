use once_cell::sync::Lazy;
use std::collections::HashMap;

/// 同義語テーブル（小文字キー → 置換候補）
static SYNONYMS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let entries: &[(&str, &[&str])] = &[
        ("quick", &["fast", "rapid", "swift", "speedy"]),
        ("brown", &["tan", "chestnut", "auburn", "russet"]),
        ("jumps", &["leaps", "bounds", "springs", "hops"]),
        ("lazy", &["idle", "sluggish", "inactive", "lethargic"]),
        ("dog", &["canine", "hound", "pup"]),
        ("nice", &["pleasant", "lovely", "delightful", "wonderful"]),
        ("good", &["excellent", "great", "fine", "solid"]),
        ("big", &["large", "huge", "enormous", "massive"]),
        ("small", &["tiny", "little", "petite", "compact"]),
        ("happy", &["joyful", "cheerful", "delighted", "pleased"]),
        ("sad", &["unhappy", "sorrowful", "melancholy", "dejected"]),
        ("amazing", &["incredible", "fantastic", "remarkable", "astonishing"]),
        ("beautiful", &["gorgeous", "stunning", "lovely", "attractive"]),
        ("important", &["crucial", "vital", "significant", "essential"]),
        ("create", &["build", "make", "construct", "develop"]),
        ("help", &["assist", "support", "aid"]),
        ("think", &["believe", "consider", "suppose"]),
        ("need", &["require", "want"]),
        ("schedule", &["arrange", "plan", "organize", "set up"]),
        ("discuss", &["talk about", "examine", "review", "consider"]),
        ("project", &["task", "assignment", "endeavor", "undertaking"]),
        ("meeting", &["gathering", "conference", "session", "discussion"]),
        ("weather", &["climate", "conditions", "atmosphere"]),
        ("today", &["this day", "currently", "at present", "right now"]),
        ("movie", &["film", "picture", "flick"]),
        ("absolutely", &["completely", "totally", "entirely", "fully"]),
        ("people", &["individuals", "persons", "folks"]),
        ("scared", &["frightened", "afraid", "terrified", "alarmed"]),
        ("fast", &["quick", "rapid", "swift"]),
        ("begin", &["start", "commence", "initiate"]),
        ("start", &["begin", "launch", "initiate"]),
        ("end", &["finish", "conclude", "complete"]),
        ("easy", &["simple", "straightforward", "effortless"]),
        ("hard", &["difficult", "challenging", "tough"]),
        ("difficult", &["hard", "challenging", "demanding"]),
        ("problem", &["issue", "difficulty", "challenge"]),
        ("answer", &["response", "reply", "solution"]),
        ("buy", &["purchase", "acquire", "obtain"]),
        ("smart", &["clever", "intelligent", "bright"]),
        ("angry", &["furious", "irritated", "annoyed"]),
        ("tired", &["exhausted", "weary", "fatigued"]),
        ("often", &["frequently", "regularly", "commonly"]),
        ("maybe", &["perhaps", "possibly"]),
        ("very", &["extremely", "really", "highly"]),
        ("car", &["vehicle", "automobile"]),
        ("house", &["home", "residence", "dwelling"]),
        ("job", &["position", "role", "occupation"]),
        ("idea", &["concept", "notion", "thought"]),
        ("result", &["outcome", "consequence", "effect"]),
        ("improve", &["enhance", "refine", "upgrade"]),
    ];
    entries.iter().copied().collect()
});

/// 単語の置換候補を返す（大文字小文字は区別しない）
pub fn synonyms_for(word: &str) -> Option<&'static [&'static str]> {
    SYNONYMS.get(word.to_lowercase().as_str()).copied()
}

/// 辞書の見出し語数
pub fn dictionary_size() -> usize {
    SYNONYMS.len()
}
