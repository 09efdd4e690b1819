//! Utilitários de texto: codificação de entidades e extração de atributos.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static ATTRIBUTES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^((?: [\w-]+="[^"]+")+)(.*)"#).expect("Invalid attributes regex")
});

// Sem backreferences no crate regex: o fechamento é conferido no replace.
static EMBEDDED_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([\w-]+)>([^<]+)</([\w-]+)>").expect("Invalid embedded tag regex")
});

/// Atributos e conteúdo separados de um trecho de texto.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedAttributes {
    /// Sequência de ` nome="valor"` (com espaço inicial), ou vazio.
    pub attributes: String,

    /// Restante do texto.
    pub content: String,
}

/// Codifica `& < > " '` como entidades HTML.
pub fn entity_encode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => encoded.push_str("&amp;"),
            '<' => encoded.push_str("&lt;"),
            '>' => encoded.push_str("&gt;"),
            '"' => encoded.push_str("&quot;"),
            '\'' => encoded.push_str("&apos;"),
            c => encoded.push(c),
        }
    }
    encoded
}

/// Formata um atributo, codificando o valor: ` nome="valor"`.
pub fn format_attribute(name: &str, value: &str) -> String {
    format!(" {}=\"{}\"", name, entity_encode(value))
}

/// Separa os atributos iniciais do conteúdo.
///
/// `' a="1" b="2"texto'` vira `attributes = ' a="1" b="2"'` e
/// `content = "texto"`. Sem atributos iniciais, tudo é conteúdo.
pub fn extract_attributes_and_content(text: &str) -> ExtractedAttributes {
    match ATTRIBUTES_PATTERN.captures(text) {
        Some(caps) => ExtractedAttributes {
            attributes: caps[1].to_string(),
            content: caps[2].to_string(),
        },
        None => ExtractedAttributes {
            attributes: String::new(),
            content: text.to_string(),
        },
    }
}

/// Extrai tags embutidas do tipo `<nome>valor</nome>`.
///
/// Apenas as tags mais internas são extraídas; tags com fechamento diferente
/// ficam no texto. O texto restante vai na chave `text`.
pub fn extract_embedded_tags(text: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();
    let remaining = EMBEDDED_TAG_PATTERN.replace_all(text, |caps: &Captures<'_>| {
        if caps[1] != caps[3] {
            return caps[0].to_string();
        }
        result.insert(caps[1].to_string(), caps[2].to_string());
        String::new()
    });
    let remaining = remaining.into_owned();
    result.insert("text".to_string(), remaining);
    result
}
