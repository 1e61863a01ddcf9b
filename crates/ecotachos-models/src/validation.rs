//! Form field validation rules.
//!
//! Mirrors the checks the CRUD forms run before submitting: a required
//! check, a blocklist of injection-looking tokens, length bounds and a
//! per-kind shape rule. The first failing rule wins.

use std::sync::LazyLock;

use regex::Regex;

static SOLO_LETRAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").unwrap());
static SOLO_NUMEROS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static CODIGO_TACHO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static TELEFONO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());
static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Substrings rejected in free-text fields (compared case-insensitively).
const DANGEROUS_TOKENS: &[&str] = &[
    "<", ">", "\"", "'", ";", "--", "/*", "*/", "drop", "delete", "insert", "update", "select",
    "exec", "execute", "script", "onclick", "onerror",
];

const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

/// User-facing validation messages.
pub mod messages {
    pub const SOLO_LETRAS: &str = "Solo se permiten letras y espacios";
    pub const SOLO_NUMEROS: &str = "Solo se permiten números";
    pub const SOLO_10_DIGITOS: &str = "El teléfono debe tener exactamente 10 dígitos";
    pub const EMAIL_INVALIDO: &str = "Email inválido";
    pub const CONTRASENA_DEBIL: &str =
        "La contraseña debe tener mínimo 8 caracteres, mayúscula, minúscula y número";
    pub const MUY_CORTO: &str = "El campo es muy corto";
    pub const MUY_LARGO: &str = "El campo excede la longitud máxima";
    pub const CARACTERES_PELIGROSOS: &str = "El campo contiene caracteres no permitidos";
    pub const URL_INVALIDA: &str = "URL inválida";
    pub const CAMPO_REQUERIDO: &str = "Este campo es requerido";
    pub const CODIGO_TACHO_INVALIDO: &str =
        "Solo se permiten letras, números, guiones y guiones bajos";
}

/// Kind of form field, selecting the shape rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Nombre,
    Apellido,
    Ciudad,
    Provincia,
    Numero,
    Telefono,
    Email,
    Contrasena,
    CodigoTacho,
    Url,
    /// Free text: only the generic rules apply
    Texto,
}

/// Options for [`validate_field`].
#[derive(Debug, Clone, Copy)]
pub struct FieldOptions {
    pub required: bool,
    pub min: usize,
    pub max: usize,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            required: false,
            min: 2,
            max: 255,
        }
    }
}

impl FieldOptions {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self, min: usize, max: usize) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

pub fn is_letters(value: &str) -> bool {
    value.is_empty() || SOLO_LETRAS.is_match(value)
}

pub fn is_digits(value: &str) -> bool {
    value.is_empty() || SOLO_NUMEROS.is_match(value)
}

pub fn is_bin_code(value: &str) -> bool {
    value.is_empty() || CODIGO_TACHO.is_match(value)
}

pub fn is_phone(value: &str) -> bool {
    value.is_empty() || TELEFONO.is_match(value)
}

pub fn is_email(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    value.chars().count() <= MAX_EMAIL_LEN && EMAIL.is_match(value)
}

pub fn is_strong_password(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    value.chars().count() >= MIN_PASSWORD_LEN
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && !value.chars().any(|c| matches!(c, '<' | '>' | '\'' | '"'))
}

pub fn is_url(value: &str) -> bool {
    value.is_empty() || url::Url::parse(value).is_ok()
}

pub fn has_dangerous_tokens(value: &str) -> bool {
    let lower = value.to_lowercase();
    DANGEROUS_TOKENS.iter().any(|token| lower.contains(token))
}

/// Validate one field. Returns the first failing rule's message.
///
/// Empty optional fields are valid.
pub fn validate_field(value: &str, kind: FieldKind, opts: FieldOptions) -> Result<(), &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if opts.required {
            Err(messages::CAMPO_REQUERIDO)
        } else {
            Ok(())
        };
    }

    if has_dangerous_tokens(value) {
        return Err(messages::CARACTERES_PELIGROSOS);
    }
    if trimmed.chars().count() < opts.min {
        return Err(messages::MUY_CORTO);
    }
    if value.chars().count() > opts.max {
        return Err(messages::MUY_LARGO);
    }

    let (ok, message) = match kind {
        FieldKind::Nombre | FieldKind::Apellido | FieldKind::Ciudad | FieldKind::Provincia => {
            (is_letters(value), messages::SOLO_LETRAS)
        }
        FieldKind::Numero => (is_digits(value), messages::SOLO_NUMEROS),
        FieldKind::Telefono => (is_phone(value), messages::SOLO_10_DIGITOS),
        FieldKind::Email => (is_email(value), messages::EMAIL_INVALIDO),
        FieldKind::Contrasena => (is_strong_password(value), messages::CONTRASENA_DEBIL),
        FieldKind::CodigoTacho => (is_bin_code(value), messages::CODIGO_TACHO_INVALIDO),
        FieldKind::Url => (is_url(value), messages::URL_INVALIDA),
        FieldKind::Texto => (true, ""),
    };

    if ok {
        Ok(())
    } else {
        Err(message)
    }
}

/// Strip control characters and collapse whitespace.
pub fn sanitize(value: &str) -> String {
    let stripped = CONTROL_CHARS.replace_all(value, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}
