// erm-client/src/http.rs
// HTTP 客户端 - 采购后端通信

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{
    BillFilter, CreateBillRequest, CreatePurchaseOrder, Payment, PaymentRequest, PurchaseBill,
    PurchaseOrder, ReceiptEvent, ReceiveRequest,
};
use shared::response::{ApiResponse, ErrorBody};
use shared::{EntityId, ItemId};

/// The remote collaborator: every call the client core makes
///
/// `NetworkHttpClient` is the production implementation. Tests inject
/// in-memory doubles.
#[async_trait]
pub trait ErmApi: Send + Sync {
    async fn fetch_order(&self, order_id: &EntityId) -> ClientResult<PurchaseOrder>;

    async fn list_orders(&self) -> ClientResult<Vec<PurchaseOrder>>;

    /// Returns the created order when the collaborator echoes it back
    async fn create_order(&self, order: &CreatePurchaseOrder)
    -> ClientResult<Option<PurchaseOrder>>;

    async fn receive_item(&self, order_id: &EntityId, request: &ReceiveRequest)
    -> ClientResult<()>;

    async fn fetch_receipts(
        &self,
        order_id: &EntityId,
        item_id: &ItemId,
    ) -> ClientResult<Vec<ReceiptEvent>>;

    /// Returns the created bill when the collaborator echoes it back
    async fn create_bill(&self, request: &CreateBillRequest) -> ClientResult<Option<PurchaseBill>>;

    async fn fetch_bill(&self, bill_id: &EntityId) -> ClientResult<PurchaseBill>;

    async fn list_bills(&self, filter: &BillFilter) -> ClientResult<Vec<PurchaseBill>>;

    /// Returns the recorded payment when the collaborator echoes it back
    async fn submit_payment(
        &self,
        bill_id: &EntityId,
        request: &PaymentRequest,
    ) -> ClientResult<Option<Payment>>;

    async fn fetch_payments(&self, bill_id: &EntityId) -> ClientResult<Vec<Payment>>;
}

/// 网络 HTTP 客户端
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    async fn send(&self, mut req: reqwest::RequestBuilder) -> ClientResult<ApiResponse<Value>> {
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        let response = req.send().await?;
        Self::handle_response(response).await
    }

    /// Unwrap the envelope, branching on `success` rather than status alone
    async fn handle_response(response: reqwest::Response) -> ClientResult<ApiResponse<Value>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // 尝试解析错误消息
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message().map(str::to_string));
            tracing::warn!(status = status.as_u16(), ?message, "Request rejected");
            return Err(ClientError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }

        let envelope: ApiResponse<Value> = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("malformed envelope: {}", e)))?;

        if !envelope.success {
            let message = envelope.message().map(str::to_string);
            tracing::warn!(status = status.as_u16(), ?message, "Request reported failure");
            return Err(ClientError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }
        Ok(envelope)
    }

    /// GET and decode `data`, which must be present
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "GET");
        let envelope = self.send(self.client.get(self.url(path))).await?;
        require_data(envelope)
    }

    /// GET a list; missing or null `data` reads as empty
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        tracing::debug!(path, "GET list");
        self.list_from(self.client.get(self.url(path))).await
    }

    /// GET a list with query parameters
    pub async fn get_list_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<Vec<T>> {
        tracing::debug!(path, "GET list");
        self.list_from(self.client.get(self.url(path)).query(query))
            .await
    }

    async fn list_from<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> ClientResult<Vec<T>> {
        let envelope = self.send(req).await?;
        match envelope.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => decode(data),
        }
    }

    /// POST a JSON body; `data` is informational and decoded leniently
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<Option<T>> {
        tracing::debug!(path, "POST");
        let envelope = self.send(self.client.post(self.url(path)).json(body)).await?;
        Ok(echoed_data(path, envelope))
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> ClientResult<T> {
    serde_json::from_value(data)
        .map_err(|e| ClientError::InvalidResponse(format!("unexpected data shape: {}", e)))
}

fn require_data<T: DeserializeOwned>(envelope: ApiResponse<Value>) -> ClientResult<T> {
    match envelope.data {
        None | Some(Value::Null) => Err(ClientError::InvalidResponse("missing data".into())),
        Some(data) => decode(data),
    }
}

/// The mutation was accepted; a body we cannot read must not turn that into a failure
fn echoed_data<T: DeserializeOwned>(path: &str, envelope: ApiResponse<Value>) -> Option<T> {
    let data = envelope.data.filter(|d| !d.is_null())?;
    match serde_json::from_value(data) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(path, error = %e, "Ignoring unrecognised response data");
            None
        }
    }
}

#[async_trait]
impl ErmApi for NetworkHttpClient {
    async fn fetch_order(&self, order_id: &EntityId) -> ClientResult<PurchaseOrder> {
        self.get(&format!("purchaseOrder/{}", order_id)).await
    }

    async fn list_orders(&self) -> ClientResult<Vec<PurchaseOrder>> {
        self.get_list("purchaseOrder").await
    }

    async fn create_order(
        &self,
        order: &CreatePurchaseOrder,
    ) -> ClientResult<Option<PurchaseOrder>> {
        self.post("purchaseOrder", order).await
    }

    async fn receive_item(
        &self,
        order_id: &EntityId,
        request: &ReceiveRequest,
    ) -> ClientResult<()> {
        self.post::<Value, _>(&format!("purchaseOrder/{}/receive", order_id), request)
            .await?;
        Ok(())
    }

    async fn fetch_receipts(
        &self,
        order_id: &EntityId,
        item_id: &ItemId,
    ) -> ClientResult<Vec<ReceiptEvent>> {
        self.get_list(&format!("purchaseOrder/{}/receive/{}", order_id, item_id))
            .await
    }

    async fn create_bill(&self, request: &CreateBillRequest) -> ClientResult<Option<PurchaseBill>> {
        self.post("purchase-bill", request).await
    }

    async fn fetch_bill(&self, bill_id: &EntityId) -> ClientResult<PurchaseBill> {
        self.get(&format!("purchase-bill/{}", bill_id)).await
    }

    async fn list_bills(&self, filter: &BillFilter) -> ClientResult<Vec<PurchaseBill>> {
        self.get_list_with_query("purchase-bill", filter).await
    }

    async fn submit_payment(
        &self,
        bill_id: &EntityId,
        request: &PaymentRequest,
    ) -> ClientResult<Option<Payment>> {
        self.post(&format!("purchase-bill/{}/pay", bill_id), request)
            .await
    }

    async fn fetch_payments(&self, bill_id: &EntityId) -> ClientResult<Vec<Payment>> {
        self.get_list(&format!("purchase-bill/{}/pay", bill_id))
            .await
    }
}
