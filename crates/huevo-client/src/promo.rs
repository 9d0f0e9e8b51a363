//! # Promotion Service
//!
//! Combo CRUD and applying a combo to the open sale.
//!
//! ## Apply Workflow
//! ```text
//! pick combo ──► promo_combo_detalle ──► price defaults to
//!                                         precio_pack > 0 ? precio_pack
//!                                                         : max(min, sugerido)
//!      │
//!      ▼
//! caja open? price ≥ precio_min_total? ── no ──► error, nothing sent
//!      │ yes
//!      ▼
//! (venta_iniciar if no draft) ──► venta_aplicar_promo_combo ──► venta_listar
//! ```

use huevo_core::promo::{ensure_can_apply, plan_create_combo, ComboDetail, ComboDraft, ComboListRow};
use huevo_core::sale::Cart;
use huevo_core::{ComboId, Money};
use serde::Serialize;
use tracing::info;

use crate::error::ClientResult;
use crate::invoke::{BusyFlag, CommandClient, Input};
use crate::notify::{ConfirmRequest, Prompter};
use crate::sale::SaleService;

#[derive(Serialize)]
struct ComboRef {
    id_combo: ComboId,
}

#[derive(Serialize)]
struct ComboListArgs {
    solo_activos: bool,
}

#[derive(Clone)]
pub struct PromoService {
    client: CommandClient,
    busy: BusyFlag,
}

impl PromoService {
    pub fn new(client: CommandClient) -> Self {
        PromoService {
            client,
            busy: BusyFlag::new(),
        }
    }

    pub async fn create(&self, nombre: &str, precio_pack: Money, draft: &ComboDraft) -> ClientResult<ComboId> {
        let input = plan_create_combo(nombre, precio_pack, draft.items())?;
        let _busy = self.busy.acquire("Alta de promo")?;
        let id: ComboId = self
            .client
            .call("promo_combo_crear", &Input::new(&input))
            .await?;
        info!(id_combo = id, nombre = %input.nombre, items = input.items.len(), "Combo created");
        Ok(id)
    }

    pub async fn list(&self, solo_activos: bool) -> ClientResult<Vec<ComboListRow>> {
        self.client
            .call("promo_combo_listar", &ComboListArgs { solo_activos })
            .await
    }

    pub async fn detail(&self, id_combo: ComboId) -> ClientResult<ComboDetail> {
        self.client
            .call("promo_combo_detalle", &ComboRef { id_combo })
            .await
    }

    /// Soft-deletes after confirmation. Returns `false` when declined.
    pub async fn delete(&self, combo: &ComboListRow, prompter: &dyn Prompter) -> ClientResult<bool> {
        let request = ConfirmRequest::new(
            "Eliminar promo",
            format!("¿Desactivar la promo «{}»? Deja de ofrecerse en ventas.", combo.nombre),
        )
        .danger();
        if !prompter.confirm(&request).await {
            return Ok(false);
        }

        let _busy = self.busy.acquire("Baja de promo")?;
        self.client
            .call_unit("promo_combo_eliminar", &ComboRef { id_combo: combo.id_combo })
            .await?;
        info!(id_combo = combo.id_combo, "Combo deactivated");
        Ok(true)
    }

    /// Applies a combo to the sale draft, starting one if needed.
    ///
    /// `precio` overrides the detail's default price.
    pub async fn apply(&self, sale: &SaleService, detail: &ComboDetail, precio: Option<Money>) -> ClientResult<Cart> {
        let precio = precio.unwrap_or_else(|| detail.default_price());
        ensure_can_apply(sale.caja_state().await, detail, precio)?;

        let id_combo = detail.combo.id_combo;
        let (id_venta, cart) = sale.apply_combo(id_combo, precio).await?;

        info!(id_venta, id_combo, precio = %precio, "Combo applied");
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caja::CajaService;
    use crate::error::ClientError;
    use crate::fake::FakeBackend;
    use crate::notify::AutoConfirm;
    use huevo_core::CoreError;
    use std::time::Duration;

    async fn open_sale(fake: &FakeBackend) -> SaleService {
        fake.set_session(1, "operador");
        fake.open_caja();
        let caja = CajaService::new(fake.client());
        caja.refresh().await.unwrap();
        SaleService::new(fake.client(), caja)
    }

    #[tokio::test]
    async fn test_create_validates_and_sends_zero_minimum() {
        let fake = FakeBackend::new();
        let promo = PromoService::new(fake.client());
        let a = fake.add_product("A", "Maple", 10, 100, 60);

        let empty = ComboDraft::new();
        assert!(promo.create("Promo", Money::from_pesos(150), &empty).await.unwrap_err().is_validation());
        assert_eq!(fake.call_count("promo_combo_crear"), 0);

        let mut draft = ComboDraft::new();
        draft.toggle(a);
        draft.set_quantity(a, 2);
        promo.create(" Promo 2x ", Money::from_pesos(180), &draft).await.unwrap();
        let args = fake.last_args("promo_combo_crear").unwrap();
        assert_eq!(args["input"]["nombre"], "Promo 2x");
        assert_eq!(args["input"]["precio_min_total"], 0);
        assert_eq!(args["input"]["items"][0]["cantidad"], 2);
    }

    #[tokio::test]
    async fn test_price_below_minimum_sends_nothing() {
        let fake = FakeBackend::new();
        let a = fake.add_product("A", "Maple", 10, 100, 60);
        let combo = fake.add_combo("Promo", 0, 180, &[(a, 2)]);
        let sale = open_sale(&fake).await;
        let promo = PromoService::new(fake.client());

        let detail = promo.detail(combo).await.unwrap();
        let err = promo
            .apply(&sale, &detail, Some(Money::from_pesos(150)))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::PriceBelowMinimum { .. })));
        assert_eq!(fake.call_count("venta_iniciar"), 0);
        assert_eq!(fake.call_count("venta_aplicar_promo_combo"), 0);
    }

    #[tokio::test]
    async fn test_apply_with_default_price_starts_draft() {
        let fake = FakeBackend::new();
        let a = fake.add_product("A", "Maple", 10, 100, 60);
        let combo = fake.add_combo("Promo", 0, 180, &[(a, 2)]);
        let sale = open_sale(&fake).await;
        let promo = PromoService::new(fake.client());

        let detail = promo.detail(combo).await.unwrap();
        assert_eq!(detail.total_sugerido, Money::from_pesos(200));
        let cart = promo.apply(&sale, &detail, None).await.unwrap();
        assert_eq!(cart.total, Money::from_pesos(200));
        assert_eq!(fake.call_count("venta_iniciar"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_during_item_add_starts_one_draft() {
        let fake = FakeBackend::new();
        let a = fake.add_product("A", "Maple", 10, 100, 60);
        let combo = fake.add_combo("Promo", 300, 0, &[(a, 2)]);
        let sale = open_sale(&fake).await;
        let promo = PromoService::new(fake.client());
        let detail = promo.detail(combo).await.unwrap();

        fake.delay_command("venta_iniciar", Duration::from_millis(50));
        let (added, applied) = tokio::join!(sale.add_item(a, 1), promo.apply(&sale, &detail, None));

        assert!(added.is_ok());
        assert!(matches!(applied, Err(ClientError::Busy(_))));
        assert_eq!(fake.call_count("venta_iniciar"), 1);
        assert_eq!(fake.call_count("venta_aplicar_promo_combo"), 0);

        promo.apply(&sale, &detail, None).await.unwrap();
        assert_eq!(fake.call_count("venta_iniciar"), 1);
    }

    #[tokio::test]
    async fn test_apply_requires_open_caja() {
        let fake = FakeBackend::new();
        let a = fake.add_product("A", "Maple", 10, 100, 60);
        let combo = fake.add_combo("Promo", 300, 0, &[(a, 2)]);
        let sale = SaleService::new(fake.client(), CajaService::new(fake.client()));
        let promo = PromoService::new(fake.client());

        let detail = promo.detail(combo).await.unwrap();
        let err = promo.apply(&sale, &detail, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::CajaClosed)));
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let fake = FakeBackend::new();
        let a = fake.add_product("A", "Maple", 10, 100, 60);
        fake.add_combo("Promo", 300, 0, &[(a, 2)]);
        let promo = PromoService::new(fake.client());

        let rows = promo.list(false).await.unwrap();
        assert!(promo.delete(&rows[0], &AutoConfirm(true)).await.unwrap());
        assert!(promo.list(true).await.unwrap().is_empty());
        let all = promo.list(false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].activo);
    }
}
