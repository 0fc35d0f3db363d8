use serde_json::Value;

use mixboard_types::api::{
    CreateBoardRequest, FieldUpdate, GrantCollaboratorRequest, UpdateBoardRequest,
};
use mixboard_types::models::CollaboratorRole;

use super::{Checker, ContractResult, root};

pub fn create_board(body: &Value) -> ContractResult<CreateBoardRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let name = c.required(obj, "", "name").and_then(|v| c.name(v, "name"));
    let description =
        Checker::optional(obj, "description").and_then(|v| c.string(v, "description"));

    let request = name.map(|name| CreateBoardRequest { name, description });
    c.finish(request)
}

pub fn update_board(body: &Value) -> ContractResult<UpdateBoardRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let name = Checker::optional(obj, "name").and_then(|v| c.name(v, "name"));
    let description = c
        .nullable(obj, "", "description", Checker::string)
        .unwrap_or(FieldUpdate::Keep);

    c.finish(Some(UpdateBoardRequest { name, description }))
}

pub fn grant_collaborator(body: &Value) -> ContractResult<GrantCollaboratorRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let email = c.required(obj, "", "email").and_then(|v| c.email(v, "email"));
    let role = c
        .required(obj, "", "role")
        .and_then(|v| c.literal(v, "role", &CollaboratorRole::ALL, CollaboratorRole::as_str));

    let request = email.zip(role).map(|(email, role)| GrantCollaboratorRequest { email, role });
    c.finish(request)
}
