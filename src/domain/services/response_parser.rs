// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{json, Map, Value};
use std::io;
use tracing::warn;

use crate::domain::models::document::Confidence;

/// 解析失败时返回的占位内容
pub const INVALID_FORMAT_PLACEHOLDER: &str = "Formato no válido";

/// 解析失败时附带的警告
pub const INVALID_FORMAT_WARNING: &str = "The model reply could not be parsed as a JSON object";

/// 序列化长度超过该值时置信度为 high
pub const HIGH_CONFIDENCE_MIN_LEN: usize = 200;

/// 模型回复的解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub data: Map<String, Value>,
    /// 回复无法解析、返回的是占位内容
    pub degraded: bool,
}

/// 去除可选的 Markdown 代码围栏
///
/// 优先取 ```` ```json ```` 标记之后的内容，否则取第一对 ```` ``` ```` 之间的内容
pub fn strip_code_fence(reply: &str) -> &str {
    let inner = if let Some((_, rest)) = reply.split_once("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if reply.contains("```") {
        reply.split("```").nth(1).unwrap_or(reply)
    } else {
        reply
    };
    inner.trim()
}

/// 解析模型回复
///
/// 无法解析为 JSON 对象时不报错，而是返回带警告字段的占位内容
pub fn parse_reply(reply: &str) -> ParsedReply {
    match serde_json::from_str::<Value>(strip_code_fence(reply)) {
        Ok(Value::Object(data)) => ParsedReply {
            data,
            degraded: false,
        },
        Ok(other) => {
            warn!("Model reply is JSON but not an object: {}", kind_of(&other));
            degraded()
        }
        Err(e) => {
            warn!("Model reply is not valid JSON: {}", e);
            degraded()
        }
    }
}

fn degraded() -> ParsedReply {
    let mut data = Map::new();
    data.insert("raw_response".into(), json!(INVALID_FORMAT_PLACEHOLDER));
    data.insert("warning".into(), json!(INVALID_FORMAT_WARNING));
    ParsedReply {
        data,
        degraded: true,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 分隔符带空格的 JSON 格式：键后写 `": "`，元素之间写 `", "`
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// 负载的展示长度（字符数）
///
/// 按 `{'k': 'v', 'n': 1}` 的写法计数，分隔符带空格
pub fn display_len(data: &Map<String, Value>) -> usize {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    if let Err(e) = data.serialize(&mut ser) {
        warn!("Failed to measure extracted payload: {}", e);
        return 0;
    }
    String::from_utf8_lossy(&buf).chars().count()
}

/// 根据展示长度推断置信度
pub fn confidence_for(data: &Map<String, Value>) -> Confidence {
    if display_len(data) > HIGH_CONFIDENCE_MIN_LEN {
        Confidence::High
    } else {
        Confidence::Medium
    }
}
