/// Full language name for a language tag, used to keep prompts unambiguous
pub fn language_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "br" | "pt-br" => "Brazilian Portuguese".to_string(),
        "pt" | "pt-pt" => "Portuguese".to_string(),
        "en" => "English".to_string(),
        "es" => "Spanish".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "it" => "Italian".to_string(),
        "nl" => "Dutch".to_string(),
        "pl" => "Polish".to_string(),
        "ru" => "Russian".to_string(),
        "uk" => "Ukrainian".to_string(),
        "tr" => "Turkish".to_string(),
        "ar" => "Arabic".to_string(),
        "hi" => "Hindi".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" => "Chinese".to_string(),
        "id" => "Indonesian".to_string(),
        "vi" => "Vietnamese".to_string(),
        "th" => "Thai".to_string(),
        _ => code.to_string(),
    }
}

/// Prompt asking the model to translate and adapt `text` for short-form video
pub fn build_translation_prompt(text: &str, source: &str, target: &str) -> String {
    format!(
        "Traduza e adapte o texto abaixo do idioma {} para {} ({}). \
         Mantenha o tom psicológico e a fala natural para vídeo curto. \
         Retorne apenas o texto traduzido.\n\n\
         Texto:\n{}",
        language_name(source),
        language_name(target),
        target,
        text
    )
}
