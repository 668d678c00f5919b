use glutenscan_types::AnalysisResult;

pub const DEFAULT_LOCALE: &str = "en-US";

pub const SYSTEM_PROMPT: &str = "You are an expert in food labelling regulation and the \
gluten-free diet.\nRespond only with valid JSON and no additional text.";

/// Caller-provided hints for the refinement prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub locale: Option<String>,
    pub product_name: Option<String>,
}

impl PromptContext {
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// The explanation locale; blank counts as unset.
    #[must_use]
    pub fn locale(&self) -> &str {
        self.locale
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCALE)
    }

    fn product_name(&self) -> Option<&str> {
        self.product_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// User prompt for the refinement call, grounded on the heuristic terms.
#[must_use]
pub fn build_analysis_prompt(
    text: &str,
    heuristics: &AnalysisResult,
    context: &PromptContext,
) -> String {
    let terms = serde_json::to_string(&heuristics.terms).unwrap_or_else(|_| "[]".to_string());
    let locale = context.locale();

    let mut prompt = format!(
        "You are a food-safety assistant specialised in the gluten-free diet.\n\
         Analyse the following ingredient list and produce a valid JSON response with the keys \
         \"verdict\" (safe|warning|unsafe|unknown), \"confidence\" (number between 0 and 1), \
         \"reasoning\" (concise explanation written in {locale}) and \"terms\" \
         (array of objects {{\"term\",\"matched\",\"rationale\"}}).\n"
    );
    if let Some(name) = context.product_name() {
        prompt.push_str(&format!("Product: {name}\n"));
    }
    prompt.push_str(&format!(
        "Respect the following heuristic findings: {terms}.\nText to analyse: {text}"
    ));
    prompt
}
