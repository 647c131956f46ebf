use std::collections::{BTreeSet, HashMap};

use lazy_static::lazy_static;
use tracing::warn;

use crate::normalize::nfkc_lower_trim;
use crate::provider::DataProvider;

lazy_static! {
    /// Built-in alias → canonical skill mapping covering the vocabulary seen
    /// in the posting catalog (office tools, web, data, soft skills).
    static ref BUILTIN_ALIASES: HashMap<&'static str, &'static str> = {
        let aliases: &[(&str, &[&str])] = &[
            ("excel", &["ms excel", "msexcel", "microsoft excel", "excel (microsoft office)", "advanced excel"]),
            ("powerpoint", &["ms powerpoint", "microsoft powerpoint", "ppt"]),
            ("word", &["ms word", "microsoft word"]),
            ("python", &["python3", "python 3", "py"]),
            ("javascript", &["js", "java script", "ecmascript", "es6"]),
            ("typescript", &["ts", "type script"]),
            ("java", &["core java", "java8", "java 8"]),
            ("sql", &["structured query language", "mysql queries"]),
            ("postgresql", &["postgres", "postgre sql", "pg"]),
            ("mongodb", &["mongo", "mongo db"]),
            ("html", &["html5"]),
            ("css", &["css3", "cascading style sheets"]),
            ("react", &["reactjs", "react.js", "react js"]),
            ("nodejs", &["node", "node.js", "node js"]),
            ("django", &["django framework", "python django"]),
            ("flask", &["python flask", "flask framework"]),
            ("data analysis", &["data analytics", "data analyst", "analytics"]),
            ("machine learning", &["ml", "machine-learning"]),
            ("artificial intelligence", &["ai"]),
            ("deep learning", &["dl", "neural networks"]),
            ("power bi", &["powerbi", "microsoft power bi"]),
            ("tableau", &["tableau desktop"]),
            ("statistics", &["stats", "statistical analysis"]),
            ("communication", &["communication skills", "verbal communication", "written communication"]),
            ("writing", &["content writing", "report writing"]),
            ("research", &["field research", "desk research"]),
            ("social media", &["social media marketing", "smm", "social media management"]),
            ("digital marketing", &["online marketing", "internet marketing"]),
            ("seo", &["search engine optimization"]),
            ("graphic design", &["graphics design", "graphic designing"]),
            ("ui/ux", &["ui ux", "ux design", "ui design", "ux/ui"]),
            ("accounting", &["tally", "bookkeeping"]),
            ("teaching", &["tutoring", "mentoring"]),
            ("project management", &["pm", "project coordination"]),
        ];

        let mut map = HashMap::new();
        for (canonical, alias_list) in aliases {
            map.insert(*canonical, *canonical);
            for alias in *alias_list {
                map.insert(*alias, *canonical);
            }
        }
        map
    };
}

/// Alias → canonical skill resolver. Constructed once from a loaded table and
/// treated as an immutable snapshot for the duration of a ranking call; an
/// empty table degrades to identity mapping (lowercase + trim only).
#[derive(Debug, Clone, Default)]
pub struct SkillAliases {
    map: HashMap<String, String>,
}

impl SkillAliases {
    pub fn new(map: HashMap<String, String>) -> Self {
        let map = map
            .into_iter()
            .map(|(alias, canonical)| (nfkc_lower_trim(&alias), nfkc_lower_trim(&canonical)))
            .filter(|(alias, canonical)| !alias.is_empty() && !canonical.is_empty())
            .collect();
        Self { map }
    }

    /// Identity-only resolver.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_ALIASES
                .iter()
                .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
                .collect(),
        )
    }

    /// Load the alias table from a data provider. Load failure must not
    /// propagate: the resolver falls back to identity mapping and warns.
    pub fn from_provider(provider: &dyn DataProvider) -> Self {
        match provider.skill_aliases() {
            Ok(map) => Self::new(map),
            Err(err) => {
                warn!(error = %err, "skill alias table unavailable; falling back to identity mapping");
                Self::empty()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Map a raw token to its canonical skill name. Unknown tokens are
    /// self-canonical.
    pub fn resolve(&self, token: &str) -> String {
        let cleaned = nfkc_lower_trim(token);
        match self.map.get(&cleaned) {
            Some(canonical) => canonical.clone(),
            None => cleaned,
        }
    }

    /// Clean, resolve and dedupe a skill list into an ordered set. The
    /// ordering makes downstream reason strings reproducible.
    pub fn normalize_set(&self, skills: &[String]) -> BTreeSet<String> {
        skills
            .iter()
            .map(|s| self.resolve(s))
            .filter(|s| !s.is_empty())
            .collect()
    }
}
