// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 提取提示模板目录
//!
//! 每种文档类型对应一条指令，描述模型必须返回的 JSON 结构。
//! 字段名是对外契约的一部分，保持产品使用的西班牙语。

use crate::domain::models::document::DocumentType;

/// 发送给模型的文档文本最大字符数
pub const MAX_PROMPT_TEXT_CHARS: usize = 4000;

const INVOICE_PROMPT: &str = r#"Analiza esta factura y extrae la siguiente información en formato JSON:
{
  "numero_factura": "string",
  "fecha": "YYYY-MM-DD",
  "proveedor": {"nombre": "string","cif": "string","direccion": "string"},
  "cliente": {"nombre": "string","cif": "string"},
  "lineas": [{"concepto": "string","cantidad": number,"precio_unitario": number,"total": number}],
  "subtotal": number,"iva": number,"total": number
}
Devuelve SOLO el JSON."#;

const CV_PROMPT: &str = r#"Analiza este CV y extrae la siguiente información en formato JSON:
{
  "datos_personales": {"nombre": "string","email": "string","telefono": "string","linkedin": "string","ubicacion": "string"},
  "resumen_profesional": "string",
  "experiencia": [{"puesto": "string","empresa": "string","periodo": "string","descripcion": "string"}],
  "educacion": [{"titulo": "string","institucion": "string","fecha": "string"}],
  "habilidades": ["string"],
  "idiomas": [{"idioma": "string","nivel": "string"}],
  "puntuacion_match": {"experiencia_años": number,"nivel_tecnico": "junior/mid/senior","areas_destacadas": ["string"]}
}
Devuelve SOLO el JSON."#;

const GENERIC_PROMPT: &str = "Analiza este documento y extrae la información más relevante en JSON.
Incluye tipo de documento, fechas, nombres, cantidades y conceptos principales.";

/// 获取文档类型对应的模板
pub fn template(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Invoice => INVOICE_PROMPT,
        DocumentType::Cv => CV_PROMPT,
        DocumentType::Generic => GENERIC_PROMPT,
    }
}

/// 按键查找模板，未知键回退到通用模板
pub fn template_for(key: &str) -> &'static str {
    template(DocumentType::or_generic(key))
}

/// 组装完整提示：模板 + 分隔符 + 截断后的文档文本
///
/// # 参数
///
/// * `key` - 客户端提交的文档类型
/// * `text` - 文档文本，仅保留前 4000 个字符
pub fn compose_prompt(key: &str, text: &str) -> String {
    let truncated = match text.char_indices().nth(MAX_PROMPT_TEXT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    };
    format!("{}\n\nTexto:\n{}", template_for(key), truncated)
}
