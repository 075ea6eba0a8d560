//! Serde models for the slice of the LSP surface this server speaks.
//! Unknown fields in client payloads are accepted and ignored.

use serde::{Deserialize, Serialize};

pub const INCREMENTAL_SYNC: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based.
    pub line: u32,
    /// Zero-based.
    pub character: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentItem {
    pub uri: String,
    pub language_id: String,
    pub version: i32,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Other initialize fields (client capabilities, trace, ...) are
    /// accepted and ignored.
    pub root_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidOpenTextDocumentParams {
    pub text_document: TextDocumentItem,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidCloseTextDocumentParams {
    pub text_document: TextDocumentIdentifier,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub trigger_characters: Vec<String>,
    pub resolve_provider: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteCommandOptions {
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureHelpOptions {
    pub trigger_characters: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    pub text_document_sync: u8,
    pub completion_provider: CompletionOptions,
    pub code_action_provider: bool,
    pub definition_provider: bool,
    pub document_formatting_provider: bool,
    pub document_range_formatting_provider: bool,
    pub document_highlight_provider: bool,
    pub document_symbol_provider: bool,
    pub execute_command_provider: ExecuteCommandOptions,
    pub hover_provider: bool,
    pub rename_provider: bool,
    pub references_provider: bool,
    pub signature_help_provider: SignatureHelpOptions,
    pub workspace_symbol_provider: bool,
    pub implementation_provider: bool,
    pub type_definition_provider: bool,
    pub folding_range_provider: bool,
}

/// Hover contents: a single marked string, or the empty marker list when
/// there is nothing to show.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HoverContents {
    Empty(Vec<MarkedString>),
    Marked(MarkedString),
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkedString {
    pub language: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hover {
    pub contents: HoverContents,
}

impl Hover {
    pub fn empty() -> Self {
        Self {
            contents: HoverContents::Empty(Vec::new()),
        }
    }

    pub fn typescript(value: impl Into<String>) -> Self {
        Self {
            contents: HoverContents::Marked(MarkedString {
                language: "typescript".to_string(),
                value: value.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initialize_params_ignore_unknown_fields() {
        let params: InitializeParams = serde_json::from_value(json!({
            "processId": 42,
            "rootUri": "file:///home/u/proj",
            "capabilities": {"textDocument": {}},
            "trace": "off"
        }))
        .unwrap();
        assert_eq!(params.root_uri.as_deref(), Some("file:///home/u/proj"));
    }

    #[test]
    fn text_document_item_uses_camel_case() {
        let item: TextDocumentItem = serde_json::from_value(json!({
            "uri": "file:///a.ts",
            "languageId": "typescript",
            "version": 1,
            "text": "let x = 1;"
        }))
        .unwrap();
        assert_eq!(item.language_id, "typescript");
    }

    #[test]
    fn empty_hover_serializes_to_empty_array_contents() {
        let value = serde_json::to_value(Hover::empty()).unwrap();
        assert_eq!(value, json!({"contents": []}));
    }

    #[test]
    fn typescript_hover_serializes_marked_string() {
        let value = serde_json::to_value(Hover::typescript("const x: number")).unwrap();
        assert_eq!(
            value,
            json!({"contents": {"language": "typescript", "value": "const x: number"}})
        );
    }
}
