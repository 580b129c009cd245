//! Sign-in, sign-up and the signed-in user's panel.

use super::{heading, when};
use crate::auth::SessionContext;
use crate::core::forms::FormOutcome;
use crate::core::users;
use crate::entities::{ChatMessage, UserNotification};
use crate::errors::{Error, Result};
use crate::query::QueryClient;
use crate::routes::Navigation;
use crate::ui::{Placeholder, Toast};
use chrono::{DateTime, Utc};
use std::fmt;

/// Chat messages shown on the panel
pub const CHAT_HISTORY_LIMIT: u64 = 50;

fn failure(e: &Error, fallback: &str) -> Toast {
    match e {
        Error::Validation { message } => Toast::error(message.clone()),
        _ => Toast::error(fallback),
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginPage {
    pub email: String,
    pub password: String,
}

impl LoginPage {
    /// Signs in; admins land on the dashboard, everyone else on their panel.
    pub async fn submit(&self, session: &SessionContext) -> FormOutcome {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return FormOutcome {
                toast: Toast::error("Preencha e-mail e senha"),
                navigation: None,
            };
        }
        match session.sign_in(self.email.trim(), &self.password).await {
            Ok(snapshot) => FormOutcome {
                toast: Toast::success("Login realizado com sucesso!"),
                navigation: Some(Navigation::to(if snapshot.is_admin {
                    "/admin/dashboard"
                } else {
                    "/painel"
                })),
            },
            Err(e) => FormOutcome {
                toast: failure(&e, "E-mail ou senha inválidos"),
                navigation: None,
            },
        }
    }
}

impl fmt::Display for LoginPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Entrar")?;
        writeln!(f, "  E-mail: [{}]", self.email)?;
        writeln!(f, "  Senha:  [••••••]")?;
        writeln!(f, "  Não tem conta? /cadastro")
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterPage {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterPage {
    pub async fn submit(&self, session: &SessionContext) -> FormOutcome {
        match session
            .sign_up(&self.name, self.email.trim(), &self.password)
            .await
        {
            Ok(_) => FormOutcome {
                toast: Toast::success("Conta criada com sucesso!"),
                navigation: Some(Navigation::to("/painel")),
            },
            Err(e) => FormOutcome {
                toast: failure(&e, "Erro ao criar conta"),
                navigation: None,
            },
        }
    }
}

impl fmt::Display for RegisterPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Criar conta")?;
        writeln!(f, "  Nome:   [{}]", self.name)?;
        writeln!(f, "  E-mail: [{}]", self.email)?;
        writeln!(f, "  Senha:  [••••••]")?;
        writeln!(f, "  Já tem conta? /login")
    }
}

/// "Meu Painel".
#[derive(Debug, Clone)]
pub struct UserPanel {
    pub name: String,
    pub email: String,
    pub member_since: Option<DateTime<Utc>>,
    pub notifications: Vec<UserNotification>,
    pub messages: Vec<ChatMessage>,
}

impl UserPanel {
    /// Builds the panel of the signed-in user.
    ///
    /// # Errors
    /// [`Error::Auth`] when nobody is signed in.
    pub async fn load(client: &QueryClient, session: &SessionContext) -> Result<Self> {
        let user = session.user().ok_or_else(|| Error::Auth {
            message: "Você precisa estar logado para acessar seu painel.".to_string(),
        })?;
        let (notifications, messages) = tokio::try_join!(
            users::unread_notifications(client, &user.id),
            users::chat_history(client, &user.id, CHAT_HISTORY_LIMIT),
        )?;
        let profile = session.profile();
        Ok(Self {
            name: profile
                .as_ref()
                .map(|p| p.display_name().to_string())
                .unwrap_or_else(|| "Usuário".to_string()),
            email: user.email.unwrap_or_default(),
            member_since: user.created_at,
            notifications,
            messages,
        })
    }
}

impl fmt::Display for UserPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Meu Painel")?;
        writeln!(f, "  {} <{}>", self.name, self.email)?;
        match self.member_since {
            Some(since) => writeln!(f, "  Membro desde {}", since.format("%d/%m/%Y"))?,
            None => writeln!(f, "  Membro desde N/A")?,
        }

        heading(f, &format!("Notificações ({})", self.notifications.len()))?;
        if self.notifications.is_empty() {
            write!(f, "{}", Placeholder::empty("Nenhuma notificação nova"))?;
        }
        for notification in &self.notifications {
            writeln!(f, "  • {}: {}", notification.title, notification.message)?;
        }

        heading(f, "Mensagens")?;
        if self.messages.is_empty() {
            write!(f, "{}", Placeholder::empty("Nenhuma mensagem"))?;
        }
        for message in &self.messages {
            let who = if message.is_from_admin { "Equipe" } else { "Você" };
            let at = message.created_at.map(when).unwrap_or_default();
            writeln!(f, "  [{at}] {who}: {}", message.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::demo;
    use crate::test_utils::{auth_settings, demo_client};

    #[tokio::test]
    async fn test_login_routes_by_role() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _client) = demo_client();
        let session = SessionContext::new(backend, auth_settings(&dir));

        let admin = LoginPage {
            email: demo::ADMIN_EMAIL.to_string(),
            password: demo::ADMIN_PASSWORD.to_string(),
        };
        let outcome = admin.submit(&session).await;
        assert_eq!(outcome.navigation, Some(Navigation::to("/admin/dashboard")));

        let wrong = LoginPage {
            email: demo::USER_EMAIL.to_string(),
            password: "errada".to_string(),
        };
        let outcome = wrong.submit(&session).await;
        assert_eq!(outcome.toast, Toast::error("E-mail ou senha inválidos"));
        assert!(outcome.navigation.is_none());
    }

    #[tokio::test]
    async fn test_register_requires_name() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _client) = demo_client();
        let session = SessionContext::new(backend, auth_settings(&dir));

        let page = RegisterPage {
            email: "novo@example.com".to_string(),
            password: "segredo1".to_string(),
            ..RegisterPage::default()
        };
        assert_eq!(page.submit(&session).await.toast, Toast::error("Nome é obrigatório"));

        let page = RegisterPage {
            name: "Novo Usuário".to_string(),
            ..page
        };
        let outcome = page.submit(&session).await;
        assert_eq!(outcome.navigation, Some(Navigation::to("/painel")));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_panel_of_signed_in_user() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let (backend, client) = demo_client();
        let session = SessionContext::new(backend, auth_settings(&dir));
        assert!(matches!(
            UserPanel::load(&client, &session).await,
            Err(Error::Auth { .. })
        ));

        session.sign_in(demo::USER_EMAIL, demo::USER_PASSWORD).await?;
        let panel = UserPanel::load(&client, &session).await?;
        assert_eq!(panel.name, "Maria Souza");
        assert_eq!(panel.notifications.len(), 2);
        assert_eq!(panel.messages.len(), 2);
        assert!(panel.to_string().contains("Equipe: Oi Maria!"));
        Ok(())
    }
}
