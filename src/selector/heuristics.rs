//! Zero-network content heuristics for model selection.

/// Capability → substrings that suggest it, in priority order.
pub const HEURISTIC_PATTERNS: &[(&str, &[&str])] = &[
    (
        "code",
        &[
            "def ", "class ", "function ", "import ", "```", "=>", "const ", "let ", "var ",
        ],
    ),
    (
        "summarization",
        &["summarize", "summary", "brief", "concise", "overview", "key points"],
    ),
    (
        "reasoning",
        &["diff", "compare", "difference", "change", "before", "after"],
    ),
];

/// Capabilities whose patterns occur in `preview` (case-insensitive), in table order.
pub fn matching_capabilities(preview: &str) -> impl Iterator<Item = &'static str> {
    let lowered = preview.to_lowercase();
    HEURISTIC_PATTERNS
        .iter()
        .filter(move |(_, patterns)| patterns.iter().any(|p| lowered.contains(p)))
        .map(|(capability, _)| *capability)
}
