/// Persona line placed at the top of every prompt.
const PERSONA: &str =
    "You are an empathetic AI assistant providing emotional support with a friendly personality.";

/// Style constraints the model is asked to follow.
const STYLE_RULES: &[&str] = &[
    "Use emojis in your responses to make them more engaging and warm.",
    "Keep responses concise (5-6 lines).",
];

/// Markup tags the model is allowed to emit. The renderer in `markup` strips
/// everything outside this set, so the two lists must stay in sync.
pub const ALLOWED_TAGS: &[&str] = &[
    "h3", "p", "ul", "ol", "li", "br", "strong", "em", "table", "tr", "td", "th",
];

/// Structured request for one support turn.
///
/// The persona, style constraints, and the user's message are kept as distinct
/// fields; the completion client calls `render` to serialize them into the
/// final prompt string. The user text is embedded verbatim — no escaping
/// against prompt injection is attempted.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportRequest {
    pub user_text: String,
}

impl SupportRequest {
    pub fn new(user_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
        }
    }

    /// Serialize the request into the prompt string sent to the model.
    pub fn render(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(PERSONA);
        prompt.push('\n');
        for rule in STYLE_RULES {
            prompt.push_str(rule);
            prompt.push('\n');
        }

        prompt.push_str("Use only these HTML tags for formatting: ");
        prompt.push_str(&ALLOWED_TAGS.join(", "));
        prompt.push_str(".\n");
        prompt.push_str("Use <h3> for main points, <p> for paragraphs, ");
        prompt.push_str("<ul> and <li> for lists, <ol> for numbered steps, ");
        prompt.push_str("<br> for line breaks, <strong> for emphasis, ");
        prompt.push_str("and <em> for gentle emphasis.\n");

        prompt.push_str("\nHere's the message: ");
        prompt.push_str(&self.user_text);

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_embeds_user_text() {
        let request = SupportRequest::new("I've been feeling anxious lately");
        let prompt = request.render();
        assert!(prompt.contains("I've been feeling anxious lately"));
        assert!(prompt.ends_with("I've been feeling anxious lately"));
    }

    #[test]
    fn render_includes_persona_and_tags() {
        let prompt = SupportRequest::new("hi").render();
        assert!(prompt.contains("empathetic AI assistant"));
        for tag in ["<h3>", "<p>", "<ul>", "<strong>"] {
            assert!(prompt.contains(tag), "missing {tag} instruction");
        }
    }
}
