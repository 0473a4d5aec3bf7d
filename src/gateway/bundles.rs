use super::*;
use crate::model::BundleInfo;

impl RestClient {
    pub fn get_bundle(&self, uuid: &str) -> std::result::Result<BundleInfo, GatewayError> {
        self.get(&format!("/rest/bundles/{}", uuid), &[])
    }

    /// Raw bytes of a bundle's contents blob.
    pub fn download_contents(&self, uuid: &str) -> std::result::Result<Vec<u8>, GatewayError> {
        self.get_bytes(&format!("/rest/bundles/{}/contents/blob/", uuid))
    }
}
