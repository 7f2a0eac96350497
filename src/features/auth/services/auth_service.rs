use crate::core::error::Result;
use crate::features::auth::clients::{AuthApi, AuthSession};
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, MeResponseDto, SignupRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use std::sync::Arc;

/// Signup and login, delegated to the managed auth service
pub struct AuthService {
    client: Arc<dyn AuthApi>,
}

impl AuthService {
    pub fn new(client: Arc<dyn AuthApi>) -> Self {
        Self { client }
    }

    pub async fn signup(&self, dto: SignupRequestDto) -> Result<AuthResponseDto> {
        let session = self
            .client
            .sign_up(&dto.email, &dto.password, dto.name.as_deref())
            .await?;
        Ok(session_to_dto(session))
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let session = self.client.sign_in(&dto.email, &dto.password).await?;
        Ok(session_to_dto(session))
    }

    pub fn current_user(&self, user: AuthenticatedUser) -> MeResponseDto {
        MeResponseDto {
            id: user.sub,
            email: user.email,
            role: user.role,
        }
    }
}

fn session_to_dto(session: AuthSession) -> AuthResponseDto {
    let name = session.user.name();
    AuthResponseDto {
        confirmation_required: session.access_token.is_none(),
        access_token: session.access_token,
        token_type: session.token_type,
        expires_in: session.expires_in,
        refresh_token: session.refresh_token,
        user: AuthUserDto {
            id: session.user.id,
            email: session.user.email,
            name,
        },
    }
}
