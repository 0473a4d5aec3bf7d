use super::*;

impl RestClient {
    pub fn execute_command(
        &self,
        worksheet_uuid: &str,
        command: &str,
    ) -> std::result::Result<CliResponse, GatewayError> {
        self.post(
            "/rest/cli/command",
            &CliRequest {
                worksheet_uuid,
                command,
                autocomplete: false,
            },
        )
    }

    pub fn complete_command(
        &self,
        worksheet_uuid: &str,
        prefix: &str,
    ) -> std::result::Result<Vec<String>, GatewayError> {
        let resp: CliResponse = self.post(
            "/rest/cli/command",
            &CliRequest {
                worksheet_uuid,
                command: prefix,
                autocomplete: true,
            },
        )?;
        Ok(resp.completions)
    }
}
