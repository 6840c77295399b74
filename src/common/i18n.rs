// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// Catálogo de mensagens: (chave, português, inglês)
const CATALOG: &[(&str, &str, &str)] = &[
    ("validation", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("missing_field", "Campo obrigatório não informado.", "A required field is missing."),
    ("invalid_field", "Campo com valor inválido.", "A field has an invalid value."),
    ("email_exists", "Este email já está cadastrado no sistema.", "This email is already registered."),
    ("invalid_credentials", "Email ou senha incorretos.", "Invalid email or password."),
    ("tenant_inactive", "Secretaria não encontrada ou desativada.", "Department not found or inactive."),
    ("session_invalid", "Token inválido ou expirado.", "Invalid or expired token."),
    ("user_not_found", "Usuário não encontrado ou desativado.", "User not found or deactivated."),
    ("not_found", "Registro não encontrado.", "Record not found."),
    ("forbidden", "Você não tem permissão para realizar esta ação.", "You are not allowed to perform this action."),
    ("tenant_context_required", "O cabeçalho X-Tenant-ID é obrigatório.", "The X-Tenant-ID header is required."),
    ("tenant_header_invalid", "Cabeçalho X-Tenant-ID inválido (não é um UUID).", "Invalid X-Tenant-ID header (not a UUID)."),
    ("ticket_closed", "Chamado concluído não aceita alterações.", "A closed ticket cannot be changed."),
    ("closing_note_required", "Por favor, adicione uma nota de fechamento.", "A closing note is required."),
    ("invalid_transition", "Transição de status não permitida.", "Status transition not allowed."),
    ("current_password", "Senha atual incorreta.", "Current password is incorrect."),
    ("password_confirmation", "A nova senha e a confirmação não coincidem.", "New password and confirmation do not match."),
    ("provider_not_configured", "OPENAI_API_KEY não configurada.", "OPENAI_API_KEY is not configured."),
    ("upstream", "Falha no provedor de respostas.", "The completion provider failed."),
    ("internal", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

/// Mensagens traduzidas, indexadas por idioma e chave.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut pt = HashMap::new();
        let mut en = HashMap::new();
        for (key, pt_msg, en_msg) in CATALOG {
            pt.insert(*key, *pt_msg);
            en.insert(*key, *en_msg);
        }

        let mut messages = HashMap::new();
        messages.insert("pt", pt);
        messages.insert("en", en);
        Self { messages }
    }

    /// Idioma desconhecido cai para o português; chave desconhecida volta como está.
    pub fn translate<'a>(&'a self, lang: &str, key: &'a str) -> &'a str {
        self.messages
            .get(lang)
            .or_else(|| self.messages.get(DEFAULT_LANG))
            .and_then(|table| table.get(key).copied())
            .unwrap_or(key)
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
