use super::*;
use crate::model::{Worksheet, WorksheetSummary};
use crate::schema::SchemaUpdate;

impl RestClient {
    /// Looks a worksheet up by name. `Ok(None)` when nothing matches.
    pub fn resolve_worksheet(
        &self,
        name: &str,
    ) -> std::result::Result<Option<WorksheetSummary>, GatewayError> {
        let found: WorksheetLookup = self.get("/rest/worksheets", &[("specs", name)])?;
        Ok(found.data.into_iter().next())
    }

    pub fn get_worksheet(&self, uuid: &str) -> std::result::Result<Worksheet, GatewayError> {
        self.get(&format!("/rest/worksheets/{}", uuid), &[])
    }

    /// Applies a schema block create/update/delete. The caller reloads the
    /// worksheet afterwards.
    pub fn update_schema_block(
        &self,
        worksheet_uuid: &str,
        update: &SchemaUpdate,
    ) -> std::result::Result<(), GatewayError> {
        tracing::debug!(
            worksheet = worksheet_uuid,
            ids = ?update.ids,
            create = update.create,
            delete = update.delete,
            "update schema block"
        );
        let _: serde_json::Value =
            self.post(&format!("/rest/worksheets/{}/add-items", worksheet_uuid), update)?;
        Ok(())
    }
}
