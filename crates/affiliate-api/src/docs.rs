use anyhow::Result;
use serde_json::to_string_pretty;
use std::path::PathBuf;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::{ServerBuilder, ServerVariableBuilder};
use utoipauto::utoipauto;

pub struct ServerAddon;

impl Modify for ServerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let server_variable = ServerVariableBuilder::new()
            .default_value("localhost:8080")
            .description(Some("Host and port the API listens on"))
            .build();
        openapi.servers = Some(vec![
            ServerBuilder::new()
                .url("http://{host}")
                .parameter("host", server_variable)
                .build(),
        ]);
    }
}

#[utoipauto(paths = "./crates/affiliate-api/src/")]
#[derive(OpenApi)]
#[openapi(
    modifiers(&ServerAddon),
    tags(
        (name = "Admin", description = "Cross-program payouts reporting"),
        (name = "Commissions", description = "Partner commissions of a program"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn generate_openapi_json(output_path: PathBuf) -> Result<()> {
        let openapi = Self::openapi();
        let json = to_string_pretty(&openapi)?;

        let file_path = output_path.join("openapi.json");

        tracing::info!("Saving OpenAPI specs to {}...", file_path.display());

        std::fs::write(&file_path, json)?;
        tracing::info!("OpenAPI specs saved!");
        Ok(())
    }
}
