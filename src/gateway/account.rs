use super::*;

impl RestClient {
    pub fn send_help_message(&self, message: &str) -> std::result::Result<(), GatewayError> {
        let path = "/rest/help/";
        self.send(self.client.post(self.url(path)).json(&HelpRequest { message }), path)?;
        Ok(())
    }

    pub fn signup(&self, form: &SignupForm) -> std::result::Result<SignupOutcome, GatewayError> {
        let path = "/rest/account/signup";
        let resp = self.send(self.no_redirect.post(self.url(path)).form(form), path)?;
        if resp.status() == reqwest::StatusCode::FOUND {
            tracing::info!(username = %form.username, "signed up");
            Ok(SignupOutcome::Created)
        } else {
            Ok(SignupOutcome::Rejected)
        }
    }
}
