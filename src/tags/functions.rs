//! Funções de tag: transformam os trechos de uma tag em HTML.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use super::text::{extract_attributes_and_content, format_attribute};

/// Função de tag: recebe os trechos internos e devolve o HTML.
pub type TagFunction = Arc<dyn Fn(&[&str]) -> String + Send + Sync>;

/// Elementos HTML conhecidos.
pub const HTML_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "dd", "del", "div", "dl",
    "dt", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "kbd", "li", "mark",
    "ol", "p", "pre", "q", "s", "small", "span", "strong", "sub", "sup", "table", "tbody", "td",
    "th", "thead", "time", "tr", "u", "ul",
];

/// Atributos HTML conhecidos.
pub const HTML_ATTRIBUTES: &[&str] = &[
    "alt", "aria-label", "class", "height", "href", "id", "lang", "rel", "src", "target", "title",
    "width",
];

/// Elementos SVG conhecidos.
pub const SVG_ELEMENTS: &[&str] = &[
    "circle", "ellipse", "g", "image", "line", "path", "polygon", "polyline", "rect", "svg",
    "text", "use",
];

/// Atributos SVG conhecidos.
pub const SVG_ATTRIBUTES: &[&str] = &[
    "cx", "cy", "d", "fill", "points", "r", "stroke", "stroke-width", "viewBox", "x", "y",
];

/// Atributos aplicados por padrão quando a tag não os define.
fn element_default_attributes(tag: &str) -> &'static [(&'static str, &'static str)] {
    match tag {
        "a" => &[("target", "_blank")],
        _ => &[],
    }
}

/// Tabela de funções de tag, com fallback opcional.
///
/// Uma busca que não encontra o nome na tabela consulta o fallback.
#[derive(Clone, Default)]
pub struct TagFunctions {
    functions: HashMap<String, TagFunction>,
    fallback: Option<Arc<TagFunctions>>,
}

impl TagFunctions {
    /// Cria uma tabela vazia.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona (ou substitui) uma função.
    pub fn insert(&mut self, name: impl Into<String>, function: TagFunction) {
        self.functions.insert(name.into(), function);
    }

    /// Copia todas as funções de `other` por cima desta tabela.
    pub fn extend(&mut self, other: TagFunctions) {
        self.functions.extend(other.functions);
    }

    /// Define o fallback consultado em buscas sem resultado.
    pub fn with_fallback(mut self, fallback: Arc<TagFunctions>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Busca uma função pelo nome.
    pub fn get(&self, name: &str) -> Option<&TagFunction> {
        self.functions
            .get(name)
            .or_else(|| self.fallback.as_deref().and_then(|f| f.get(name)))
    }

    /// Verifica se existe função com esse nome.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Renderiza `name` com os trechos dados.
    pub fn render(&self, name: &str, chunks: &[&str]) -> Option<String> {
        self.get(name).map(|f| f(chunks))
    }

    /// Número de funções próprias (sem contar o fallback).
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Verifica se a tabela própria está vazia.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for TagFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("TagFunctions")
            .field("functions", &names)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

fn class_tag_function(class_name: &str) -> TagFunction {
    let class_name = class_name.to_string();
    Arc::new(move |chunks: &[&str]| {
        format!("<span class=\"{}\">{}</span>", class_name, chunks.concat())
    })
}

fn attribute_tag_function(name: &str) -> TagFunction {
    let name = name.to_string();
    Arc::new(move |chunks: &[&str]| format_attribute(&name, &chunks.concat()))
}

fn element_tag_function(tag: &str) -> TagFunction {
    let tag = tag.to_string();
    let defaults = element_default_attributes(&tag);
    Arc::new(move |chunks: &[&str]| {
        let extracted = extract_attributes_and_content(&chunks.concat());
        let mut attributes = extracted.attributes;

        for (name, value) in defaults {
            if attributes.contains(&format!(" {}=\"", name)) {
                continue;
            }
            attributes.push_str(&format_attribute(name, value));
        }

        if extracted.content.is_empty() {
            format!("<{}{} />", tag, attributes)
        } else {
            format!("<{}{}>{}</{}>", tag, attributes, extracted.content, tag)
        }
    })
}

/// Funções que envolvem o conteúdo em `<span class="...">`.
pub fn create_class_tag_functions_uncached(class_names: &[String]) -> TagFunctions {
    let mut functions = TagFunctions::new();
    for class_name in class_names {
        functions.insert(class_name.as_str(), class_tag_function(class_name));
    }
    functions
}

/// Funções que geram ` nome="valor"`.
pub fn create_attribute_tag_functions(tags: &[&str]) -> TagFunctions {
    let mut functions = TagFunctions::new();
    for tag in tags {
        functions.insert(*tag, attribute_tag_function(tag));
    }
    functions
}

/// Funções que geram elementos, aplicando atributos padrão.
pub fn create_element_tag_functions(tags: &[&str]) -> TagFunctions {
    let mut functions = TagFunctions::new();
    for tag in tags {
        functions.insert(*tag, element_tag_function(tag));
    }
    functions
}

static DEFAULT_TAG_FUNCTIONS: LazyLock<Arc<TagFunctions>> = LazyLock::new(|| {
    // Em nomes repetidos vale o último: atributos HTML sobrepõem elementos.
    let mut functions = create_element_tag_functions(SVG_ELEMENTS);
    functions.extend(create_attribute_tag_functions(SVG_ATTRIBUTES));
    functions.extend(create_element_tag_functions(HTML_ELEMENTS));
    functions.extend(create_attribute_tag_functions(HTML_ATTRIBUTES));
    Arc::new(functions)
});

/// Tabela padrão com elementos e atributos HTML e SVG.
pub fn default_tag_functions() -> Arc<TagFunctions> {
    Arc::clone(&DEFAULT_TAG_FUNCTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_function() {
        let functions = create_attribute_tag_functions(&["a"]);
        assert_eq!(functions.render("a", &["123"]).unwrap(), r#" a="123""#);
    }

    #[test]
    fn test_class_function() {
        let functions = create_class_tag_functions_uncached(&["c".to_string()]);
        assert_eq!(
            functions.render("c", &["1", "23"]).unwrap(),
            r#"<span class="c">123</span>"#
        );
    }

    #[test]
    fn test_element_function() {
        let functions = create_element_tag_functions(&["e"]);
        assert_eq!(functions.render("e", &["123"]).unwrap(), "<e>123</e>");
    }

    #[test]
    fn test_element_with_attributes() {
        let functions = create_element_tag_functions(&["e2"]);
        assert_eq!(
            functions.render("e2", &[r#" a="123" bcd="456"789"#]).unwrap(),
            r#"<e2 a="123" bcd="456">789</e2>"#
        );
    }

    #[test]
    fn test_element_self_closing() {
        let functions = default_tag_functions();
        let src = functions.render("src", &["/images/flag-de.png"]).unwrap();
        assert_eq!(
            functions.render("image", &[src.as_str()]).unwrap(),
            r#"<image src="/images/flag-de.png" />"#
        );
    }

    #[test]
    fn test_default_link_target() {
        let functions = default_tag_functions();
        assert_eq!(
            functions.render("a", &["content"]).unwrap(),
            r#"<a target="_blank">content</a>"#
        );
        assert_eq!(
            functions.render("a", &[r#" target="custom"content"#]).unwrap(),
            r#"<a target="custom">content</a>"#
        );
    }

    #[test]
    fn test_fallback_lookup() {
        let classes = create_class_tag_functions_uncached(&["li".to_string()])
            .with_fallback(default_tag_functions());

        // Classe com o mesmo nome de um elemento tem prioridade.
        assert_eq!(
            classes.render("li", &["x"]).unwrap(),
            r#"<span class="li">x</span>"#
        );
        assert_eq!(classes.render("em", &["x"]).unwrap(), "<em>x</em>");
        assert!(classes.render("nope", &["x"]).is_none());
        assert_eq!(classes.len(), 1);
    }

    #[test]
    fn test_default_table_is_shared() {
        assert!(Arc::ptr_eq(&default_tag_functions(), &default_tag_functions()));
    }
}
