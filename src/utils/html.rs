use ammonia;

/// Sanitizes question text coming from the admin API.
///
/// Whitelist based: formatting tags such as <b> or <p> survive, while
/// <script>, <iframe> and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitizes every option of a question.
pub fn clean_all(inputs: &[String]) -> Vec<String> {
    inputs.iter().map(|s| clean_html(s)).collect()
}
