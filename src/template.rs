use serde::Serialize;
use tinytemplate::TinyTemplate;

/// Default layout for streamed answers.
pub const STREAM_TEMPLATE: &str = "{preamble}\n\nПользователь: {prompt}\nАссистент:";
/// Default layout for the single-shot fallback.
pub const FALLBACK_TEMPLATE: &str = "{preamble}\n\nВопрос: {prompt}\nОтвет:";

/// Renders a string template using `TinyTemplate`.
///
/// Template variables use the `{name}` syntax. Values are inserted verbatim,
/// without HTML escaping.
///
/// # Examples
///
/// ```
/// use xenofont::template::render_template;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Ctx { text: &'static str }
///
/// let out = render_template("Hello {text}!", &Ctx { text: "<world>" }).unwrap();
/// assert_eq!(out, "Hello <world>!");
/// ```
pub fn render_template<T: Serialize>(
    template: &str,
    ctx: &T,
) -> Result<String, tinytemplate::error::Error> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("tpl", template)?;
    tt.render("tpl", ctx)
}

#[derive(Serialize)]
struct PromptCtx<'a> {
    preamble: &'a str,
    prompt: &'a str,
}

/// Compose the full model prompt from a preamble and the user's request.
///
/// Falls back to plain concatenation when `template` does not render.
pub fn compose_prompt(template: &str, preamble: &str, prompt: &str) -> String {
    let ctx = PromptCtx { preamble, prompt };
    render_template(template, &ctx).unwrap_or_else(|e| {
        tracing::warn!(?e, "prompt template render failed");
        format!("{preamble}\n\n{prompt}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_layout() {
        let out = compose_prompt(STREAM_TEMPLATE, "Ты ассистент.", "сколько звёзд?");
        assert_eq!(out, "Ты ассистент.\n\nПользователь: сколько звёзд?\nАссистент:");
    }

    #[test]
    fn fallback_layout_keeps_quotes() {
        let out = compose_prompt(FALLBACK_TEMPLATE, "P", "что такое \"rust\"");
        assert_eq!(out, "P\n\nВопрос: что такое \"rust\"\nОтвет:");
    }

    #[test]
    fn broken_template_degrades() {
        let out = compose_prompt("{missing}", "P", "q");
        assert_eq!(out, "P\n\nq");
    }
}
