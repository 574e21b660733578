use http::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

/// Inbound webhook payload from the voice platform. Either a batched
/// tool-call envelope (`message.type == "tool-calls"`) or a direct call with
/// the booking fields at the top level.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceToolRequest {
    pub message: Option<AssistantMessage>,
    pub call: Option<CallScope>,
    pub assistant: Option<CallScope>,
    #[serde(flatten)]
    pub direct: BookingArgs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "toolCallList")]
    pub tool_call_list: Option<Vec<ToolCall>>,
}

/// One tool call inside the batched envelope. The platform emits two layouts:
/// name/arguments at the top level, or nested under `function`. Both occur in
/// the wild, so the accessors below check both places.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: Option<String>,
    pub function: Option<ToolFunction>,
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolFunction {
    pub name: Option<String>,
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallScope {
    #[serde(default)]
    pub variables: ScopeVariables,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeVariables {
    #[serde(rename = "clerkId")]
    pub clerk_id: Option<String>,
}

/// Loosely-typed request fields, parsed once at the edge. Handlers only ever
/// see this strongly-typed optional-field view, never raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingArgs {
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub appointment_type: Option<String>,
    pub reason: Option<String>,
    pub clerk_id: Option<String>,
}

impl VoiceToolRequest {
    /// The tool calls, when the payload matches the batched envelope shape.
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        let message = self.message.as_ref()?;
        if message.kind.as_deref() != Some("tool-calls") {
            return None;
        }
        message.tool_call_list.as_deref()
    }

    fn scoped_clerk_id(&self) -> Option<&str> {
        self.call
            .as_ref()
            .and_then(|scope| scope.variables.clerk_id.as_deref())
            .or_else(|| {
                self.assistant
                    .as_ref()
                    .and_then(|scope| scope.variables.clerk_id.as_deref())
            })
    }

    /// Resolve the external identity token for one call. Precedence is
    /// behaviorally significant: explicit argument, then call variables, then
    /// assistant variables, then the web-call headers.
    pub fn resolve_clerk_id(&self, explicit: Option<String>, headers: &HeaderMap) -> Option<String> {
        explicit
            .or_else(|| self.scoped_clerk_id().map(str::to_string))
            .or_else(|| header_string(headers, "x-clerk-id"))
            .or_else(|| header_string(headers, "x-user-id"))
    }
}

impl ToolCall {
    /// Intent name, wherever the platform put it.
    pub fn intent(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.function.as_ref().and_then(|f| f.name.as_deref()))
    }

    /// Arguments as `BookingArgs`. Malformed argument objects degrade to
    /// all-`None` so field-presence validation produces the spoken prompt
    /// instead of a transport error.
    pub fn booking_args(&self) -> BookingArgs {
        self.arguments
            .clone()
            .or_else(|| self.function.as_ref().and_then(|f| f.arguments.clone()))
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
