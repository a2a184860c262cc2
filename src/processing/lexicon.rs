//! Static word lists used by the rule-based linguistic backend and the vectorizers

use std::collections::{HashMap, HashSet};

/// English stop words (the usual scikit-learn / spaCy core set)
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done",
    "down", "due", "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc",
    "even", "ever", "every", "everyone", "everything", "everywhere", "except", "few", "for",
    "former", "formerly", "from", "further", "had", "has", "have", "having", "he", "hence",
    "her", "here", "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his",
    "how", "however", "i", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself",
    "just", "last", "latter", "latterly", "least", "less", "many", "may", "me", "meanwhile",
    "might", "mine", "more", "moreover", "most", "mostly", "much", "must", "my", "myself",
    "namely", "neither", "never", "nevertheless", "next", "no", "nobody", "none", "noone",
    "nor", "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one",
    "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
    "over", "own", "per", "perhaps", "please", "quite", "rather", "re", "really", "same",
    "seem", "seemed", "seeming", "seems", "several", "she", "should", "since", "so", "some",
    "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they", "this",
    "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
    "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
    "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Technology names tagged as PRODUCT entities
pub const TECH_PRODUCTS: &[&str] = &[
    "python", "java", "javascript", "typescript", "rust", "golang", "c++", "c#", "ruby", "php",
    "swift", "kotlin", "scala", "haskell", "elixir", "perl", "matlab", "sql", "nosql",
    "postgresql", "postgres", "mysql", "sqlite", "mongodb", "redis", "cassandra", "dynamodb",
    "elasticsearch", "kafka", "rabbitmq", "spark", "hadoop", "airflow", "snowflake", "bigquery",
    "docker", "kubernetes", "terraform", "ansible", "jenkins", "git", "github", "gitlab",
    "linux", "unix", "nginx", "graphql", "grpc", "react", "angular", "vue", "svelte",
    "node.js", "nodejs", "next.js", "django", "flask", "fastapi", "spring", "spring boot",
    "rails", ".net", "tensorflow", "pytorch", "keras", "scikit-learn", "pandas", "numpy",
    "jupyter", "tableau", "power bi", "excel", "jira", "confluence", "html", "css", "aws",
    "azure", "gcp", "google cloud", "lambda", "s3", "ec2", "salesforce", "sap", "figma",
    "photoshop", "webpack", "jest", "pytest", "selenium", "cypress", "prometheus", "grafana",
];

/// Organization names tagged as ORG entities
pub const ORGANIZATIONS: &[&str] = &[
    "google", "microsoft", "amazon", "apple", "meta", "facebook", "netflix", "ibm", "oracle",
    "intel", "nvidia", "cisco", "adobe", "uber", "airbnb", "spotify", "stripe", "shopify",
    "twitter", "linkedin", "deloitte", "accenture", "mckinsey", "pwc", "kpmg", "ernst & young",
    "goldman sachs", "jpmorgan", "morgan stanley", "barclays", "hsbc", "siemens", "bosch",
    "samsung", "sony", "tesla", "openai", "anthropic", "mozilla", "red hat", "atlassian",
    "mit", "stanford university", "harvard university", "oxford university",
    "cambridge university", "university of oxford", "university of cambridge",
    "imperial college",
];

/// Countries and cities tagged as GPE entities
pub const LOCATIONS: &[&str] = &[
    "united states", "usa", "us-based", "united kingdom", "uk", "england", "scotland",
    "ireland", "germany", "france", "spain", "portugal", "italy", "netherlands", "belgium",
    "switzerland", "austria", "poland", "sweden", "norway", "denmark", "finland", "canada",
    "mexico", "brazil", "argentina", "india", "china", "japan", "singapore", "australia",
    "new zealand", "israel", "london", "manchester", "edinburgh", "dublin", "berlin", "munich",
    "hamburg", "paris", "madrid", "barcelona", "lisbon", "amsterdam", "rotterdam", "brussels",
    "zurich", "vienna", "warsaw", "stockholm", "oslo", "copenhagen", "helsinki", "new york",
    "san francisco", "seattle", "boston", "chicago", "austin", "los angeles", "toronto",
    "vancouver", "montreal", "sydney", "melbourne", "tokyo", "bangalore", "bengaluru",
    "mumbai", "delhi", "hyderabad", "tel aviv",
];

/// Terms that mark a noun phrase as a technical skill
pub const DEFAULT_TECH_TERMS: &[&str] = &["python", "java", "sql", "aws", "cloud", "docker", "kubernetes"];

pub const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
    "sept", "oct", "nov", "dec",
];

pub const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "fifteen", "twenty", "thirty", "hundred", "thousand", "million",
];

pub const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "any", "some", "no",
    "all", "both", "either", "neither", "another", "such", "what", "which", "whatever",
];

pub const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves", "you", "your",
    "yours", "yourself", "he", "him", "his", "she", "her", "hers", "it", "its", "they", "them",
    "their", "theirs", "who", "whom", "whose", "someone", "anyone", "everyone",
];

pub const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "from", "of", "about", "into", "onto", "over",
    "under", "across", "through", "between", "among", "within", "without", "during", "after",
    "before", "above", "below", "via", "per", "toward", "towards", "upon", "around", "like",
];

pub const AUXILIARIES: &[&str] = &[
    "be", "is", "are", "was", "were", "been", "being", "am", "have", "has", "had", "having",
    "do", "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might",
    "must",
];

pub const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "so", "yet", "&"];

pub const PARTICLES: &[&str] = &["to", "not", "n't"];

pub const ADVERBS: &[&str] = &[
    "very", "also", "well", "highly", "often", "always", "never", "quickly", "currently",
    "previously", "closely", "effectively", "strongly", "independently", "remotely", "here",
    "there", "now", "then", "already", "still", "just", "too", "even", "ideally",
];

/// Base forms treated as verbs by the tagger
pub const VERBS: &[&str] = &[
    "build", "develop", "manage", "create", "implement", "maintain", "deploy", "write",
    "collaborate", "use", "drive", "deliver", "ensure", "mentor", "improve", "optimize",
    "optimise", "analyze", "analyse", "automate", "integrate", "migrate", "debug",
    "coordinate", "communicate", "join", "grow", "reduce", "increase", "launch", "define",
    "translate", "contribute", "participate", "require", "prefer", "seek", "apply", "hire",
    "offer", "provide", "achieve", "solve", "serve", "produce", "make", "take", "run", "teach",
    "organize", "organise", "execute", "establish", "streamline", "enhance", "monitor",
    "operate", "negotiate", "spearhead", "oversee", "evaluate", "assess", "identify",
    "resolve", "configure", "install", "refactor", "get", "give", "bring", "keep", "find",
    "hold", "begin", "think", "win", "go",
];

/// Words that are nouns in their base form but verbs when inflected
pub const NOUN_VERBS: &[&str] = &[
    "design", "test", "lead", "code", "model", "program", "plan", "research", "document",
    "present", "partner", "support", "review", "work", "scale", "ship", "own", "champion",
    "influence", "help", "architect", "train", "coach", "look", "report", "process", "record",
    "handle", "release", "script", "target", "focus",
];

/// Adjectives the suffix rules would otherwise miss
pub const ADJECTIVES: &[&str] = &[
    "senior", "junior", "strong", "excellent", "good", "great", "solid", "deep", "broad",
    "new", "large", "small", "fast", "agile", "scalable", "distributed", "experienced",
    "skilled", "proficient", "familiar", "remote", "hybrid", "full-time", "part-time",
    "cross-functional", "full-stack", "backend", "frontend", "high", "low", "key", "main",
    "modern", "complex", "robust", "reliable", "secure", "detailed", "relevant",
    "related", "required", "preferred", "bonus", "hands-on", "written", "verbal", "best",
];

/// Words ending in -ing that behave as nouns
pub const GERUND_NOUNS: &[&str] = &[
    "engineering", "programming", "testing", "learning", "computing", "marketing", "accounting",
    "training", "banking", "networking", "modeling", "modelling", "processing", "scheduling",
    "scripting", "string", "thing", "nothing", "something", "anything", "everything",
    "morning", "evening", "ceiling", "meeting", "building", "hosting", "logging", "caching",
    "monitoring", "reporting", "consulting", "recruiting", "onboarding", "manufacturing",
    "understanding", "background", "funding", "pricing", "clustering", "tooling",
];

/// Nouns that the adjective suffix rules would mistag
pub const NOUN_EXCEPTIONS: &[&str] = &[
    "proposal", "portal", "journal", "signal", "terminal", "interval", "approval", "capital",
    "hospital", "material", "potential", "principal", "rental", "referral", "logic", "topic",
    "metric", "music", "traffic", "clinic", "public", "mechanic", "graphic", "tactic",
    "arithmetic", "analytic", "table", "variable", "deliverable", "cable", "stable",
    "objective", "executive", "initiative", "incentive", "perspective", "representative",
    "archive", "individual", "manual",
];

/// Words whose trailing "s" is not a plural marker
pub const NO_LEMMA: &[&str] = &[
    "analytics", "physics", "mathematics", "statistics", "economics", "series", "news",
    "sales", "devops", "mlops", "ops", "kubernetes", "windows", "ios", "macos", "aws", "js",
    "status", "campus", "bonus", "focus", "process", "access", "business", "success", "class",
    "address", "express", "less", "across", "basis", "analysis", "thesis", "diagnosis",
    "always", "various", "its", "this", "us", "yes", "ethos", "chaos",
];

/// Irregular inflections mapped to their lemma
pub const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("was", "be"), ("were", "be"), ("is", "be"), ("are", "be"), ("am", "be"), ("been", "be"),
    ("being", "be"), ("has", "have"), ("had", "have"), ("having", "have"), ("did", "do"),
    ("does", "do"), ("done", "do"), ("built", "build"), ("led", "lead"), ("ran", "run"),
    ("wrote", "write"), ("written", "write"), ("made", "make"), ("taught", "teach"),
    ("went", "go"), ("gone", "go"), ("won", "win"), ("grew", "grow"), ("grown", "grow"),
    ("took", "take"), ("taken", "take"), ("gave", "give"), ("given", "give"), ("got", "get"),
    ("brought", "bring"), ("thought", "think"), ("sought", "seek"), ("held", "hold"),
    ("kept", "keep"), ("found", "find"), ("began", "begin"), ("begun", "begin"),
    ("children", "child"), ("people", "person"), ("men", "man"), ("women", "woman"),
    ("analyses", "analysis"), ("criteria", "criterion"), ("indices", "index"),
    ("better", "good"), ("best", "good"),
];

/// Stem endings that lost a silent "e" when a suffix was attached
pub const SILENT_E_STEMS: &[&str] = &[
    "at", "iz", "is", "ag", "iv", "rv", "lv", "nc", "uc", "ac", "us", "ur", "bl", "pl", "tl",
    "dl", "gl", "ak", "ov", "rg", "dg",
];

pub fn word_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|&w| w.to_string()).collect()
}

/// Create set of common English stop words
pub fn english_stop_words() -> HashSet<String> {
    word_set(STOP_WORDS)
}

pub fn irregular_lemmas() -> HashMap<String, String> {
    IRREGULAR_LEMMAS
        .iter()
        .map(|&(form, lemma)| (form.to_string(), lemma.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tech_terms_are_products() {
        let products = word_set(TECH_PRODUCTS);
        for term in DEFAULT_TECH_TERMS.iter().filter(|t| **t != "cloud") {
            assert!(products.contains(*term), "{} should be a known product", term);
        }
    }

    #[test]
    fn test_stop_words_lowercase() {
        assert!(STOP_WORDS.iter().all(|w| w.chars().all(|c| !c.is_uppercase())));
        assert!(english_stop_words().contains("the"));
        assert!(!english_stop_words().contains("python"));
    }
}
