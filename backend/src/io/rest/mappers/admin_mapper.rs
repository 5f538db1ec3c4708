use shared::{
    Administrator as SharedAdministrator, CreateAdministratorRequest, LoginResponse,
    UpdateAdministratorRequest,
};

use crate::domain::commands::administrator::{
    CreateAdministratorCommand, LoginResult, UpdateAdministratorCommand,
};
use crate::domain::models::administrator::Administrator;

pub struct AdminMapper;

impl AdminMapper {
    /// The password hash never leaves the backend
    pub fn to_dto(domain: Administrator) -> SharedAdministrator {
        SharedAdministrator {
            id: domain.id,
            username: domain.username,
            full_name: domain.full_name,
            email: domain.email,
            created_at: domain.created_at,
        }
    }

    pub fn to_dto_list(administrators: Vec<Administrator>) -> Vec<SharedAdministrator> {
        administrators.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_create_command(request: CreateAdministratorRequest) -> CreateAdministratorCommand {
        CreateAdministratorCommand {
            username: request.username,
            full_name: request.full_name,
            email: request.email,
            password: request.password,
        }
    }

    pub fn to_update_command(admin_id: String, request: UpdateAdministratorRequest) -> UpdateAdministratorCommand {
        UpdateAdministratorCommand {
            admin_id,
            username: request.username,
            full_name: request.full_name,
            email: request.email,
            password: request.password,
        }
    }

    pub fn to_login_response(result: LoginResult) -> LoginResponse {
        LoginResponse {
            token: result.token,
            administrator: Self::to_dto(result.administrator),
        }
    }
}
