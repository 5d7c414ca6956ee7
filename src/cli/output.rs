use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Output a success message in the appropriate format
pub fn success(format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&envelope(message, data))?),
        OutputFormat::Text => println!("✓ {}", message),
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn error(format: &OutputFormat, message: &str) {
    match format {
        OutputFormat::Json => println!("{}", json!({ "success": false, "error": message })),
        OutputFormat::Text => eprintln!("Error: {}", message),
    }
}

fn envelope(message: &str, data: Option<Value>) -> Value {
    let mut response = json!({ "success": true, "message": message });
    if let (Some(Value::Object(extra)), Value::Object(map)) = (data, &mut response) {
        map.extend(extra);
    }
    response
}
