//! The OpenAPI document served at `/openapi.json`.

use axum::Json;
use serde_json::{Value, json};

use crate::auth::API_KEY_HEADER;

pub async fn openapi() -> Json<Value> {
    Json(document())
}

pub fn document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Docent",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Retrieval-augmented question answering over an indexed passage corpus."
        },
        "paths": {
            "/query": { "post": query_operation() },
            "/health": {
                "get": {
                    "summary": "Liveness probe",
                    "responses": { "200": { "description": "The server is up" } }
                }
            }
        },
        "components": {
            "securitySchemes": {
                "ApiKey": { "type": "apiKey", "in": "header", "name": API_KEY_HEADER }
            },
            "schemas": schemas()
        }
    })
}

fn json_content(schema: &str) -> Value {
    json!({ "application/json": { "schema": { "$ref": format!("#/components/schemas/{schema}") } } })
}

fn query_operation() -> Value {
    let error = |description: &str| json!({ "description": description, "content": json_content("Error") });

    json!({
        "summary": "Answer a question from the indexed corpus",
        "security": [{ "ApiKey": [] }],
        "requestBody": { "required": true, "content": json_content("QueryRequest") },
        "responses": {
            "200": {
                "description": "The generated answer with its source documents",
                "content": json_content("QueryResponse")
            },
            "401": error("Missing or invalid API key"),
            "422": error("Invalid request body"),
            "500": error("A provider failed")
        }
    })
}

fn schemas() -> Value {
    let query_request = json!({
        "type": "object",
        "required": ["query"],
        "properties": { "query": { "type": "string", "minLength": 1 } }
    });
    let document = json!({
        "type": "object",
        "required": ["page_content", "metadata", "type"],
        "properties": {
            "page_content": { "type": "string" },
            "metadata": {
                "type": "object",
                "properties": { "title": { "type": "string" }, "id": { "type": "integer" } }
            },
            "type": { "type": "string", "enum": ["Document"] }
        }
    });
    let query_response = json!({
        "type": "object",
        "required": ["query", "result", "source_documents"],
        "properties": {
            "query": { "type": "string" },
            "result": { "type": "string" },
            "source_documents": { "type": "array", "items": { "$ref": "#/components/schemas/Document" } }
        }
    });
    let error = json!({
        "type": "object",
        "required": ["detail"],
        "properties": { "detail": { "type": "string" } }
    });

    json!({
        "QueryRequest": query_request,
        "Document": document,
        "QueryResponse": query_response,
        "Error": error
    })
}
