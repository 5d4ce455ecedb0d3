use lexbridge::chat::ChatMessage;
use lexbridge::conversion::chat_to_params;
use lexbridge::responses::{InputMessage, InputRole, RequestOptions, ResponsesInput};
use lexbridge::{convert_messages, to_responses_request};
use serde_json::json;

#[test]
fn building_twice_is_byte_identical() {
    let opts = RequestOptions {
        input: ResponsesInput::Messages(vec![
            InputMessage::new(InputRole::Developer, "Cite the governing statute."),
            InputMessage::new(InputRole::User, "Can my landlord keep the deposit?"),
        ]),
        instructions: Some("You are a tenancy assistant.".into()),
        max_output_tokens: Some(800),
        temperature: Some(0.2),
        json_mode: true,
        store: Some(false),
        ..Default::default()
    };

    let a = serde_json::to_string(&to_responses_request("gpt-4.1", &opts).to_params().unwrap())
        .unwrap();
    let b = serde_json::to_string(&to_responses_request("gpt-4.1", &opts).to_params().unwrap())
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn single_system_message_becomes_instructions() {
    let messages = vec![
        ChatMessage::system("You draft NDAs."),
        ChatMessage::user("Mutual NDA please."),
        ChatMessage::assistant("Which jurisdiction?"),
        ChatMessage::user("Ontario."),
    ];

    let out = convert_messages(&messages);
    assert_eq!(out.instructions.as_deref(), Some("You draft NDAs."));
    assert_eq!(out.input.len(), 3);
    assert_eq!(
        out.input.iter().map(|m| m.role).collect::<Vec<_>>(),
        vec![InputRole::User, InputRole::Assistant, InputRole::User]
    );
    assert_eq!(out.input[2].content, "Ontario.");
}

#[test]
fn later_system_messages_become_developer_turns_in_place() {
    let messages = vec![
        ChatMessage::system("Primary framing."),
        ChatMessage::user("First question."),
        ChatMessage::system("Secondary framing."),
        ChatMessage::assistant("An answer."),
    ];

    let out = convert_messages(&messages);
    assert_eq!(out.instructions.as_deref(), Some("Primary framing."));
    assert_eq!(
        out.input,
        vec![
            InputMessage::new(InputRole::User, "First question."),
            InputMessage::new(InputRole::Developer, "Secondary framing."),
            InputMessage::new(InputRole::Assistant, "An answer."),
        ]
    );
}

#[test]
fn json_mode_alone_adds_only_text_format() {
    let opts = RequestOptions {
        json_mode: true,
        ..RequestOptions::new("List the parties as JSON.")
    };

    let params = to_responses_request("gpt-4.1", &opts).to_params().unwrap();
    assert_eq!(
        serde_json::Value::Object(params),
        json!({
            "model": "gpt-4.1",
            "input": "List the parties as JSON.",
            "text": {"format": {"type": "json_object"}}
        })
    );
}

#[test]
fn end_to_end_builder_output() {
    let messages = vec![
        ChatMessage::system("Be concise."),
        ChatMessage::user("2+2?"),
    ];

    let params = chat_to_params("gpt-4.1", &messages, Some(50)).unwrap();
    assert_eq!(
        serde_json::Value::Object(params),
        json!({
            "model": "gpt-4.1",
            "input": [{"role": "user", "content": "2+2?"}],
            "instructions": "Be concise.",
            "max_output_tokens": 50
        })
    );

    let text = lexbridge::extract_output_text(&json!({"output_text": "4"}));
    assert_eq!(text.as_deref(), Some("4"));
}

#[test]
fn no_defaults_are_injected() {
    let params = to_responses_request("gpt-4.1", &RequestOptions::new("hello"))
        .to_params()
        .unwrap();
    let mut keys: Vec<&str> = params.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["input", "model"]);
}
