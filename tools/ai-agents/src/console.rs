//! Terminal rendering of conversation messages.
//!
//! **Interaction**: Used by the agents' step callbacks; pure string formatting so
//! it can be tested without a terminal.

use langgraph::Message;

const TITLE_WIDTH: usize = 80;

/// `=====  Title  =====` banner, 80 columns wide.
pub fn title_banner(title: &str) -> String {
    let padded = format!(" {title} ");
    let side = TITLE_WIDTH.saturating_sub(padded.len()) / 2;
    let left = "=".repeat(side);
    let right = if padded.len() % 2 == 1 {
        format!("{left}=")
    } else {
        left.clone()
    };
    format!("{left}{padded}{right}")
}

/// Banner plus body, the way the math agent prints each new message.
pub fn pretty_message(message: &Message) -> String {
    let title = match message {
        Message::System(_) => "System Message",
        Message::User(_) => "Human Message",
        Message::Assistant { .. } => "Ai Message",
        Message::Tool(_) => "Tool Message",
    };
    let mut out = title_banner(title);
    if let Message::Tool(r) = message {
        out.push_str(&format!("\nName: {}", r.name));
    }
    out.push_str("\n\n");
    out.push_str(message.content());
    let calls = message.tool_calls();
    if !calls.is_empty() {
        out.push_str("\nTool Calls:");
        for call in calls {
            out.push_str(&format!("\n  {} ({})\n Call ID: {}\n  Args:", call.name, call.id, call.id));
            match serde_json::from_str::<serde_json::Value>(&call.arguments) {
                Ok(serde_json::Value::Object(args)) => {
                    for (k, v) in args {
                        out.push_str(&format!("\n    {k}: {v}"));
                    }
                }
                _ => out.push_str(&format!("\n    {}", call.arguments)),
            }
        }
    }
    out
}

/// Names of the tools a message requests, e.g. `["update", "save"]`.
pub fn tool_names(message: &Message) -> Vec<&str> {
    message.tool_calls().iter().map(|c| c.name.as_str()).collect()
}
