const REDACTED: &str = "[REDACTED]";

const SECRET_KEY_MARKERS: [&str; 7] = [
    "webhook",
    "secret",
    "password",
    "token",
    "authorization",
    "apikey",
    "api_key",
];

const PERSONAL_KEY_MARKERS: [&str; 5] = ["email", "cuit", "cuil", "documento", "tax_id"];

/// Redacts by field name first, then masks email addresses found in values.
pub(crate) fn redact_field(field_name: &str, value: String) -> String {
    let field = field_name.to_ascii_lowercase();
    if SECRET_KEY_MARKERS
        .iter()
        .chain(PERSONAL_KEY_MARKERS.iter())
        .any(|marker| field.contains(marker))
    {
        return REDACTED.to_string();
    }

    mask_emails(&value)
}

/// `jane.doe@mail.test` becomes `j***@mail.test`.
pub(crate) fn mask_emails(value: &str) -> String {
    if !value.contains('@') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut token = String::new();

    for ch in value.chars() {
        if is_email_char(ch) {
            token.push(ch);
            continue;
        }
        out.push_str(&mask_token(&token));
        token.clear();
        out.push(ch);
    }
    out.push_str(&mask_token(&token));
    out
}

fn is_email_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '%' | '+' | '-' | '@')
}

fn mask_token(token: &str) -> String {
    let Some((local, domain)) = token.split_once('@') else {
        return token.to_string();
    };
    if local.is_empty() || !domain.contains('.') {
        return token.to_string();
    }

    let first: String = local.chars().take(1).collect();
    format!("{first}***@{domain}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_and_personal_fields_are_redacted() {
        assert_eq!(redact_field("access_token", "abc".to_string()), REDACTED);
        assert_eq!(redact_field("payer_email", "a@b.test".to_string()), REDACTED);
        assert_eq!(redact_field("recipient_cuit", "2012".to_string()), REDACTED);
        assert_eq!(redact_field("listing_id", "owner-1".to_string()), "owner-1");
    }

    #[test]
    fn emails_inside_free_text_are_masked() {
        assert_eq!(
            mask_emails("rejected for jane.doe@mail.test (422)"),
            "rejected for j***@mail.test (422)"
        );
        assert_eq!(mask_emails("owner|monthly"), "owner|monthly");
        assert_eq!(mask_emails("@handle"), "@handle");
    }
}
