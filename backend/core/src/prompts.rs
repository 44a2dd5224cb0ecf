//! Instruction templates sent to the upstream model.
//!
//! The system prompt is a pure function of the mode (plus the category for
//! random mode). The user message carries the topic, or a fixed instruction in
//! random mode.

use crate::traits::{ChatMessage, ChatRequest};
use crate::types::{Category, GenerationRequest, Mode};

const LIST_PROMPT: &str = "Ты — креативный генератор идей. Пользователь задаёт тему, ты генерируешь от 5 до 10 конкретных, полезных и оригинальных идей по этой теме. Каждая идея должна быть понятной, практичной и вдохновляющей. Отвечай на русском. Формат: пронумерованный список. Каждая идея — 1-2 предложения с кратким пояснением.";

const SINGLE_PROMPT: &str = "Ты — креативный генератор идей. Пользователь задаёт тему, ты генерируешь ОДНУ сильную, конкретную идею и к ней 3 чётких шага реализации. Идея должна быть практичной и вдохновляющей. Отвечай на русском. Формат:
**Идея:** [описание идеи в 2-3 предложениях]

**Шаги реализации:**
1. [конкретный первый шаг]
2. [конкретный второй шаг]
3. [конкретный третий шаг]";

const RANDOM_PROMPT: &str = "Ты — креативный генератор случайных идей. Придумай одну неожиданную, оригинальную идею из совершенно случайной области (технологии, бизнес, творчество, наука, повседневная жизнь — что угодно). Идея должна быть конкретной, практичной и вдохновляющей. Каждый раз выбирай новую область. Отвечай на русском.
Формат:
**Область:** [случайная область]
**Идея:** [описание в 2-3 предложениях]
**Почему это круто:** [1 предложение]";

/// Fixed user message for random mode. The category never appears here.
pub const RANDOM_USER_MESSAGE: &str = "Сгенерируй случайную идею";

/// Select the system prompt for a mode.
pub fn system_prompt(mode: Mode, category: Option<Category>) -> String {
    match (mode, category) {
        (Mode::List, _) => LIST_PROMPT.to_string(),
        (Mode::Single, _) => SINGLE_PROMPT.to_string(),
        (Mode::Random, None) => RANDOM_PROMPT.to_string(),
        (Mode::Random, Some(category)) => category_prompt(category),
    }
}

fn category_prompt(category: Category) -> String {
    let domain = category.label();
    format!(
        "Ты — креативный генератор случайных идей. Придумай одну неожиданную, оригинальную идею в области «{domain}». Внутри этой области выбирай каждый раз новое направление. Идея должна быть конкретной, практичной и вдохновляющей. Отвечай на русском.
Формат:
**Область:** {domain} — [конкретное направление]
**Идея:** [описание в 2-3 предложениях]
**Почему это круто:** [1 предложение]"
    )
}

/// Build the user turn for a request.
pub fn user_message(request: &GenerationRequest) -> String {
    match request.mode {
        Mode::Random => RANDOM_USER_MESSAGE.to_string(),
        _ => format!("Тема: {}", request.trimmed_topic().unwrap_or_default()),
    }
}

/// Assemble the two-message streaming conversation for the upstream provider.
pub fn build_chat(request: &GenerationRequest, model: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(system_prompt(request.mode, request.category)),
            ChatMessage::user(user_message(request)),
        ],
        stream: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_prompt_and_topic_label() {
        let req = GenerationRequest::new(Mode::List).with_topic("бизнес идеи");
        let chat = build_chat(&req, "test-model");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert!(chat.messages[0].content.contains("от 5 до 10"));
        assert_eq!(chat.messages[1].role, "user");
        assert_eq!(chat.messages[1].content, "Тема: бизнес идеи");
        assert!(chat.stream);
        assert_eq!(chat.model, "test-model");
    }

    #[test]
    fn test_single_prompt_has_three_steps() {
        let prompt = system_prompt(Mode::Single, None);
        assert!(prompt.contains("**Идея:**"));
        assert!(prompt.contains("**Шаги реализации:**"));
        assert!(prompt.contains("3. "));
    }

    #[test]
    fn test_random_without_category_uses_fixed_user_message() {
        let req = GenerationRequest::new(Mode::Random);
        let chat = build_chat(&req, "m");
        assert_eq!(chat.messages[0].content, RANDOM_PROMPT);
        assert_eq!(chat.messages[1].content, RANDOM_USER_MESSAGE);
    }

    #[test]
    fn test_random_category_only_changes_system_prompt() {
        let req = GenerationRequest::new(Mode::Random).with_category(Category::Science);
        let chat = build_chat(&req, "m");
        assert!(chat.messages[0].content.contains("«наука»"));
        assert!(chat.messages[0].content.contains("**Почему это круто:**"));
        assert_eq!(chat.messages[1].content, RANDOM_USER_MESSAGE);
    }

    #[test]
    fn test_random_ignores_topic() {
        let req = GenerationRequest::new(Mode::Random).with_topic("кофе");
        assert_eq!(user_message(&req), RANDOM_USER_MESSAGE);
    }
}
