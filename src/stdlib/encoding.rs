//! Binary, hex, base64 and URL conversions, plus identifier and random
//! value generators

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::error::{Result, ScriptError};
use crate::scope::Scope;
use crate::signature::{any, Parameter, Signature};
use crate::stdlib::{Args, Builtin, CallFn};
use crate::value::{Value, ValueKind, MAX_COLLECTION_LEN};

/// Setting that keeps null characters when hex is decoded to a string
pub const HEX_NULL_SETTING: &str = "$jitterbit.scripting.hex.enable_null_character";

const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn string_in(name: &'static str, param: &'static str, returns: ValueKind, call: CallFn) -> Builtin {
    Builtin::new(
        name,
        Signature::new(returns, vec![Parameter::required(param, ValueKind::String)]),
        call,
    )
}

/// Initialize the encoding functions
pub fn init() -> Vec<Builtin> {
    vec![
        // StringToHex(str) -> string
        string_in("StringToHex", "str", ValueKind::String, |args, _| {
            Ok(Value::String(hex::encode(args.string(0))))
        }),
        // HexToString(hexStr) -> string
        string_in("HexToString", "hexStr", ValueKind::String, hex_to_string),
        // HexToBinary(hexStr) -> binary
        string_in("HexToBinary", "hexStr", ValueKind::Binary, |args, _| {
            decode_hex(args).map(Value::Binary)
        }),
        // BinaryToHex(arg) -> string
        Builtin::new(
            "BinaryToHex",
            Signature::new(ValueKind::String, vec![Parameter::required("arg", ValueKind::Binary)]),
            |args, _| Ok(Value::String(hex::encode(args.binary(0)?))),
        ),
        // Base64Encode(arg) -> string
        Builtin::new(
            "Base64Encode",
            Signature::new(ValueKind::String, vec![Parameter::required("arg", any())]),
            |args, _| {
                let bytes = match args.value(0) {
                    Value::Binary(bytes) => bytes.clone(),
                    other => other.to_string().into_bytes(),
                };
                Ok(Value::String(STANDARD.encode(bytes)))
            },
        ),
        // Base64Decode(encoded) -> binary
        string_in("Base64Decode", "encoded", ValueKind::Binary, |args, _| {
            STANDARD
                .decode(args.string(0).trim())
                .map(Value::Binary)
                .map_err(|e| ScriptError::invalid_argument(args.function(), format!("invalid base64: {}", e)))
        }),
        // URLEncode(url) -> string
        string_in("URLEncode", "url", ValueKind::String, |args, _| {
            Ok(Value::String(urlencoding::encode(&args.string(0)).into_owned()))
        }),
        // URLDecode(url) -> string
        string_in("URLDecode", "url", ValueKind::String, |args, _| {
            let input = args.string(0).replace('+', " ");
            urlencoding::decode(&input)
                .map(|s| Value::String(s.into_owned()))
                .map_err(|e| ScriptError::invalid_argument(args.function(), format!("invalid encoding: {}", e)))
        }),
        // GUID() -> string
        Builtin::new("GUID", Signature::new(ValueKind::String, vec![]), |_, _| {
            Ok(Value::String(uuid::Uuid::new_v4().to_string()))
        }),
        // Random(min, max) -> number
        Builtin::new(
            "Random",
            Signature::new(
                ValueKind::Number,
                vec![
                    Parameter::required("min", ValueKind::Number),
                    Parameter::required("max", ValueKind::Number),
                ],
            ),
            |args, _| {
                let (min, max) = (args.integer(0)?, args.integer(1)?);
                if min > max {
                    return Err(ScriptError::invalid_argument(
                        args.function(),
                        format!("min {} is greater than max {}", min, max),
                    ));
                }
                Ok(Value::Number(rand::thread_rng().gen_range(min..=max) as f64))
            },
        ),
        // RandomString(len[, chars]) -> string
        Builtin::new(
            "RandomString",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("len", ValueKind::Number),
                    Parameter::defaulted("chars", ValueKind::String, Value::from(ALPHANUMERIC)),
                ],
            ),
            |args, _| {
                let len = usize::try_from(args.integer(0)?)
                    .map_err(|_| ScriptError::invalid_argument(args.function(), "length must not be negative"))?;
                if len > MAX_COLLECTION_LEN {
                    return Err(ScriptError::invalid_argument(
                        args.function(),
                        format!("length {} exceeds {}", len, MAX_COLLECTION_LEN),
                    ));
                }
                let alphabet: Vec<char> = args.string(1).chars().collect();
                if alphabet.is_empty() {
                    return Err(ScriptError::invalid_argument(args.function(), "character set is empty"));
                }
                let pick = Uniform::from(0..alphabet.len());
                let mut rng = rand::thread_rng();
                Ok(Value::String((0..len).map(|_| alphabet[pick.sample(&mut rng)]).collect()))
            },
        ),
    ]
}

fn decode_hex(args: &Args) -> Result<Vec<u8>> {
    hex::decode(args.string(0).trim())
        .map_err(|e| ScriptError::invalid_argument(args.function(), format!("invalid hex string: {}", e)))
}

/// Decoded text stops at the first null character unless the hex setting
/// allows nulls
fn hex_to_string(args: &mut Args, scope: &mut Scope) -> Result<Value> {
    let mut bytes = decode_hex(args)?;
    let keep_nulls = scope.get(HEX_NULL_SETTING).to_bool().unwrap_or(false);
    if !keep_nulls {
        if let Some(end) = bytes.iter().position(|b| *b == 0) {
            bytes.truncate(end);
        }
    }
    Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}
