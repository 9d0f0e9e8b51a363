//! In-memory backend for workflow tests.
//!
//! Implements [`CommandTransport`] over a small stateful model of the POS
//! backend: users and session, caja, sale drafts, products with movement
//! and price history, combos, and the expense/payroll ledger. Report
//! commands answer with canned replies set by the test.
//!
//! Errors use the backend's own wording ("UNIQUE constraint failed", "CHECK
//! constraint failed: stock_actual", "no login") so the services' error
//! mapping is exercised end to end.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::invoke::CommandClient;
use crate::transport::CommandTransport;

#[derive(Debug, Clone)]
struct FakeProduct {
    id: i64,
    codigo: String,
    nombre: String,
    stock: i64,
    precio: i64,
    costo: i64,
    activo: bool,
    modo: String,
    factor: i64,
}

#[derive(Debug, Clone)]
struct FakeLine {
    id_item: i64,
    id_producto: i64,
    cantidad: i64,
    precio: i64,
}

#[derive(Debug, Clone)]
struct FakeCombo {
    id: i64,
    nombre: String,
    precio_pack: i64,
    precio_min_total: i64,
    activo: bool,
    items: Vec<(i64, i64)>,
}

#[derive(Debug, Default)]
struct FakeState {
    seq: i64,
    clock: i64,
    users: Vec<(i64, String, String, String, String)>,
    session: Option<(i64, String)>,
    caja_abierta: bool,
    caja_ids: Vec<i64>,
    products: BTreeMap<i64, FakeProduct>,
    movements: Vec<(i64, Value)>,
    prices: Vec<(i64, Value)>,
    sales: HashMap<i64, Vec<FakeLine>>,
    finalized: Vec<(i64, i64, Value)>,
    combos: BTreeMap<i64, FakeCombo>,
    gastos: Vec<Value>,
    sueldos: Vec<Value>,
    canned: HashMap<String, Value>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: Vec<(String, Value)>,
    tuple_cart: bool,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    fn now(&mut self) -> String {
        self.clock += 1;
        format!(
            "2026-10-19 {:02}:{:02}:{:02}",
            10 + self.clock / 3600,
            (self.clock / 60) % 60,
            self.clock % 60
        )
    }
}

/// Scriptable fake of the POS backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

fn rejected(command: &str, message: impl Into<String>) -> ClientError {
    ClientError::Rejected {
        command: command.to_string(),
        message: message.into(),
    }
}

fn field<'a>(args: &'a Value, name: &str) -> &'a Value {
    args.get("input")
        .and_then(|i| i.get(name))
        .or_else(|| args.get(name))
        .unwrap_or(&Value::Null)
}

fn int(args: &Value, name: &str) -> i64 {
    field(args, name).as_i64().unwrap_or_default()
}

fn text(args: &Value, name: &str) -> String {
    field(args, name).as_str().unwrap_or_default().to_string()
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn client(&self) -> CommandClient {
        CommandClient::new(Arc::new(self.clone()))
    }

    // ---- scripting ---------------------------------------------------------

    pub fn add_user(&self, nombre_usuario: &str, password: &str, rol: &str) -> i64 {
        self.with(|s| {
            let id = s.next_id();
            s.users.push((
                id,
                nombre_usuario.to_string(),
                nombre_usuario.to_string(),
                password.to_string(),
                rol.to_string(),
            ));
            id
        })
    }

    pub fn set_session(&self, id: i64, rol: &str) {
        self.with(|s| s.session = Some((id, rol.to_string())));
    }

    pub fn clear_session(&self) {
        self.with(|s| s.session = None);
    }

    pub fn open_caja(&self) {
        self.with(|s| s.caja_abierta = true);
    }

    pub fn add_product(&self, codigo: &str, nombre: &str, stock: i64, precio: i64, costo: i64) -> i64 {
        self.with(|s| {
            let id = s.next_id();
            s.products.insert(
                id,
                FakeProduct {
                    id,
                    codigo: codigo.to_string(),
                    nombre: nombre.to_string(),
                    stock,
                    precio,
                    costo,
                    activo: true,
                    modo: "unitario".to_string(),
                    factor: 1,
                },
            );
            id
        })
    }

    pub fn add_combo(&self, nombre: &str, precio_pack: i64, precio_min_total: i64, items: &[(i64, i64)]) -> i64 {
        self.with(|s| {
            let id = s.next_id();
            s.combos.insert(
                id,
                FakeCombo {
                    id,
                    nombre: nombre.to_string(),
                    precio_pack,
                    precio_min_total,
                    activo: true,
                    items: items.to_vec(),
                },
            );
            id
        })
    }

    pub fn reply_with(&self, command: &str, reply: Value) {
        self.with(|s| s.canned.insert(command.to_string(), reply));
    }

    pub fn fail_command(&self, command: &str, message: &str) {
        self.with(|s| s.failures.insert(command.to_string(), message.to_string()));
    }

    pub fn recover_command(&self, command: &str) {
        self.with(|s| s.failures.remove(command));
    }

    pub fn delay_command(&self, command: &str, delay: Duration) {
        self.with(|s| s.delays.insert(command.to_string(), delay));
    }

    pub fn use_tuple_cart_replies(&self) {
        self.with(|s| s.tuple_cart = true);
    }

    // ---- inspection --------------------------------------------------------

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.with(|s| s.calls.clone())
    }

    pub fn call_count(&self, command: &str) -> usize {
        self.with(|s| s.calls.iter().filter(|(c, _)| c == command).count())
    }

    pub fn last_args(&self, command: &str) -> Option<Value> {
        self.with(|s| {
            s.calls
                .iter()
                .rev()
                .find(|(c, _)| c == command)
                .map(|(_, a)| a.clone())
        })
    }

    pub fn stock_of(&self, id_producto: i64) -> Option<i64> {
        self.with(|s| s.products.get(&id_producto).map(|p| p.stock))
    }

    pub fn caja_abierta(&self) -> bool {
        self.with(|s| s.caja_abierta)
    }

    pub fn finalized_count(&self) -> usize {
        self.with(|s| s.finalized.len())
    }

    // ---- command handling --------------------------------------------------

    fn handle(&self, command: &str, args: &Value) -> ClientResult<Value> {
        let mut guard = self.state.lock().unwrap();
        let s = &mut *guard;

        if let Some(message) = s.failures.get(command) {
            return Err(rejected(command, message.clone()));
        }
        if let Some(reply) = s.canned.get(command) {
            return Ok(reply.clone());
        }

        match command {
            // auth & users
            "login" => {
                let user = text(args, "nombre_usuario");
                let pass = text(args, "password");
                let found = s
                    .users
                    .iter()
                    .find(|u| u.2 == user && u.3 == pass)
                    .map(|u| (u.0, u.4.clone()));
                match found {
                    Some(session) => {
                        s.session = Some(session);
                        Ok(json!(true))
                    }
                    None => Ok(json!(false)),
                }
            }
            "session_info" => Ok(match &s.session {
                Some((id, rol)) => json!({"usuarioId": id, "rol": rol}),
                None => Value::Null,
            }),
            "auth_logout" => {
                s.session = None;
                Ok(Value::Null)
            }
            "usuario_crear" => {
                let user = text(args, "nombre_usuario");
                if s.users.iter().any(|u| u.2 == user) {
                    return Err(rejected(command, "UNIQUE constraint failed: usuarios.nombre_usuario"));
                }
                let id = s.next_id();
                s.users
                    .push((id, text(args, "nombre"), user, text(args, "password"), "operador".into()));
                Ok(json!(id))
            }
            "usuario_listar_opciones" | "usuarios_listar_operadores" => Ok(Value::Array(
                s.users
                    .iter()
                    .map(|u| json!({"id_usuario": u.0, "nombre": u.1}))
                    .collect(),
            )),

            // caja
            "caja_esta_abierta" => Ok(json!(s.caja_abierta)),
            "caja_abrir" => {
                if s.session.is_none() {
                    return Err(rejected(command, "no login"));
                }
                if s.caja_abierta {
                    return Err(rejected(command, "ya hay una caja abierta"));
                }
                s.caja_abierta = true;
                let id = s.next_id();
                s.caja_ids.push(id);
                Ok(json!(id))
            }
            "caja_cerrar" => {
                if s.session.is_none() {
                    return Err(rejected(command, "no login"));
                }
                s.caja_abierta = false;
                Ok(Value::Null)
            }
            "caja_resumen_diario" => {
                let total: i64 = s.finalized.iter().map(|f| f.1).sum();
                Ok(json!({
                    "id_cajas": s.caja_ids,
                    "fecha_min": "2026-10-19 09:00:00",
                    "fecha_max": "2026-10-19 18:00:00",
                    "cantidad_cajas": s.caja_ids.len(),
                    "cantidad_ventas": s.finalized.len(),
                    "total_general": total,
                    "por_medio": [{"medio": "efectivo", "total_medio": total}],
                }))
            }

            // venta
            "venta_iniciar" => {
                if !s.caja_abierta {
                    return Err(rejected(command, "no hay caja abierta"));
                }
                let id = s.next_id();
                s.sales.insert(id, Vec::new());
                Ok(json!(id))
            }
            "venta_agregar_item" => {
                let id_venta = int(args, "id_venta");
                let id_producto = int(args, "id_producto");
                let cantidad = int(args, "cantidad");
                let precio = match s.products.get(&id_producto) {
                    Some(p) => p.precio,
                    None => return Err(rejected(command, "producto inexistente")),
                };
                let id_item = s.next_id();
                let Some(lines) = s.sales.get_mut(&id_venta) else {
                    return Err(rejected(command, "venta inexistente"));
                };
                lines.push(FakeLine {
                    id_item,
                    id_producto,
                    cantidad,
                    precio,
                });
                Ok(Value::Null)
            }
            "venta_set_cantidad" | "venta_quitar_item" => {
                let id_item = int(args, "id_item");
                let cantidad = int(args, "cantidad");
                for lines in s.sales.values_mut() {
                    if command == "venta_quitar_item" || cantidad <= 0 {
                        lines.retain(|l| l.id_item != id_item);
                    } else if let Some(line) = lines.iter_mut().find(|l| l.id_item == id_item) {
                        line.cantidad = cantidad;
                    }
                }
                Ok(Value::Null)
            }
            "venta_listar" => {
                let id_venta = int(args, "id_venta");
                let Some(lines) = s.sales.get(&id_venta) else {
                    return Err(rejected(command, "venta inexistente"));
                };
                let rows: Vec<Value> = lines
                    .iter()
                    .map(|l| {
                        let nombre = s
                            .products
                            .get(&l.id_producto)
                            .map(|p| p.nombre.clone())
                            .unwrap_or_default();
                        json!({
                            "id_item": l.id_item,
                            "id_producto": l.id_producto,
                            "nombre": nombre,
                            "cantidad": l.cantidad,
                            "precio_unitario": l.precio,
                            "subtotal": l.precio * l.cantidad,
                        })
                    })
                    .collect();
                let total: i64 = lines.iter().map(|l| l.precio * l.cantidad).sum();
                Ok(if s.tuple_cart {
                    json!([rows, total])
                } else {
                    json!({"lineas": rows, "total": total})
                })
            }
            "venta_finalizar" => {
                let id_venta = int(args, "id_venta");
                let pagos = field(args, "pagos").clone();
                let Some(lines) = s.sales.remove(&id_venta) else {
                    return Err(rejected(command, "venta inexistente"));
                };
                let total: i64 = lines.iter().map(|l| l.precio * l.cantidad).sum();
                let pagado: i64 = pagos
                    .as_array()
                    .map(|ps| ps.iter().filter_map(|p| p["monto"].as_i64()).sum())
                    .unwrap_or_default();
                if pagado != total {
                    s.sales.insert(id_venta, lines);
                    return Err(rejected(command, "pagos no coinciden con el total"));
                }
                for line in &lines {
                    if let Some(p) = s.products.get_mut(&line.id_producto) {
                        p.stock -= line.cantidad;
                    }
                }
                s.finalized.push((id_venta, total, pagos));
                Ok(Value::Null)
            }
            "venta_cancelar" => {
                let id_venta = int(args, "id_venta");
                s.sales.remove(&id_venta);
                Ok(Value::Null)
            }
            "venta_aplicar_promo_combo" => {
                let id_venta = int(args, "id_venta");
                let id_combo = int(args, "id_combo");
                let precio = int(args, "precio_total_pack");
                let Some(combo) = s.combos.get(&id_combo).cloned() else {
                    return Err(rejected(command, "combo inexistente"));
                };
                if precio < combo.precio_min_total {
                    return Err(rejected(command, "precio por debajo del minimo"));
                }
                let id_item = s.next_id();
                let Some(lines) = s.sales.get_mut(&id_venta) else {
                    return Err(rejected(command, "venta inexistente"));
                };
                let first = combo.items.first().map(|i| i.0).unwrap_or_default();
                lines.push(FakeLine {
                    id_item,
                    id_producto: first,
                    cantidad: 1,
                    precio,
                });
                Ok(Value::Null)
            }
            "historial_ventas_hoy" => {
                let mut rows = Vec::new();
                for (id_venta, total, pagos) in &s.finalized {
                    let detalle = pagos
                        .as_array()
                        .map(|ps| {
                            ps.iter()
                                .map(|p| format!("{}: {}", p["medio"].as_str().unwrap_or(""), p["monto"]))
                                .collect::<Vec<_>>()
                                .join(", ")
                        })
                        .unwrap_or_default();
                    rows.push(json!({
                        "id_venta": id_venta,
                        "hora": "10:00",
                        "codigo_producto": "P001",
                        "producto": "Maple",
                        "cantidad": 1,
                        "precio_unitario": total,
                        "subtotal": total,
                        "total_venta": total,
                        "pagos_detalle": detalle,
                    }));
                }
                Ok(Value::Array(rows))
            }

            // stock
            "stock_listar" => {
                let solo_activos = args["solo_activos"].as_bool().unwrap_or(false);
                let q = args["q"].as_str().map(str::to_lowercase);
                let rows: Vec<Value> = s
                    .products
                    .values()
                    .filter(|p| !solo_activos || p.activo)
                    .filter(|p| match &q {
                        Some(q) => p.nombre.to_lowercase().contains(q) || p.codigo.to_lowercase().contains(q),
                        None => true,
                    })
                    .map(|p| {
                        json!({
                            "id_producto": p.id,
                            "codigo": p.codigo,
                            "nombre": p.nombre,
                            "stock_actual": p.stock,
                            "precio_venta_actual": p.precio,
                            "costo_actual": p.costo,
                            "activo": if p.activo { 1 } else { 0 },
                            "reposicion_modo": p.modo,
                            "reposicion_factor": p.factor,
                        })
                    })
                    .collect();
                Ok(Value::Array(rows))
            }
            "producto_crear" => {
                let codigo = text(args, "codigo");
                if s.products.values().any(|p| p.codigo == codigo) {
                    return Err(rejected(command, "UNIQUE constraint failed: productos.codigo"));
                }
                let id = s.next_id();
                let precio = int(args, "precio_venta");
                let costo = int(args, "costo");
                s.products.insert(
                    id,
                    FakeProduct {
                        id,
                        codigo,
                        nombre: text(args, "nombre"),
                        stock: 0,
                        precio,
                        costo,
                        activo: true,
                        modo: text(args, "reposicion_modo"),
                        factor: int(args, "reposicion_factor"),
                    },
                );
                let now = s.now();
                for (tipo, precio) in [("venta", precio), ("costo", costo)] {
                    let id_precio = s.next_id();
                    s.prices.push((
                        id,
                        json!({"id_precio": id_precio, "tipo": tipo, "precio": precio,
                               "vigente_desde": now, "vigente_hasta": null}),
                    ));
                }
                Ok(json!({"id_producto": id}))
            }
            "stock_ajustar" | "stock_fijar_absoluto" | "stock_registrar_merma" | "registrar_compra" | "stock_compra" => {
                let id = int(args, "id_producto").max(int(args, "idProducto"));
                let Some(actual) = s.products.get(&id).map(|p| p.stock) else {
                    return Err(rejected(command, "producto inexistente"));
                };
                let (delta, motivo) = match command {
                    "stock_ajustar" => (int(args, "delta"), text(args, "motivo")),
                    "stock_fijar_absoluto" => (int(args, "nuevo") - actual, text(args, "motivo")),
                    "stock_registrar_merma" => (-int(args, "cantidad"), "merma".to_string()),
                    "stock_compra" => {
                        let factor = if text(args, "unidad") == "CAJON" { 12 } else { 1 };
                        (int(args, "cantidad") * factor, "compra".to_string())
                    }
                    _ => (int(args, "cantidad"), "compra".to_string()),
                };
                if actual + delta < 0 {
                    return Err(rejected(
                        command,
                        "CHECK constraint failed: stock_actual >= 0",
                    ));
                }
                let id_mov = s.next_id();
                let now = s.now();
                if let Some(p) = s.products.get_mut(&id) {
                    p.stock = actual + delta;
                }
                s.movements.push((
                    id,
                    json!({"id_movimiento": id_mov, "cantidad_delta": delta, "motivo": motivo,
                           "referencia": field(args, "referencia"), "fecha_hora": now}),
                ));
                Ok(Value::Null)
            }
            "precio_actualizar" => {
                let id = int(args, "id_producto");
                let tipo = text(args, "tipo");
                let nuevo = int(args, "nuevo");
                let Some(p) = s.products.get_mut(&id) else {
                    return Err(rejected(command, "producto inexistente"));
                };
                if tipo == "venta" {
                    p.precio = nuevo;
                } else {
                    p.costo = nuevo;
                }
                let id_precio = s.next_id();
                let now = s.now();
                s.prices.push((
                    id,
                    json!({"id_precio": id_precio, "tipo": tipo, "precio": nuevo,
                           "vigente_desde": now, "vigente_hasta": null}),
                ));
                Ok(Value::Null)
            }
            "producto_set_activo" => {
                let id = int(args, "id_producto");
                let activo = field(args, "activo").as_bool().unwrap_or(false);
                match s.products.get_mut(&id) {
                    Some(p) => {
                        p.activo = activo;
                        Ok(Value::Null)
                    }
                    None => Err(rejected(command, "producto inexistente")),
                }
            }
            "producto_actualizar_reposicion" => {
                let id = int(args, "id_producto");
                let modo = text(args, "reposicion_modo");
                let factor = int(args, "reposicion_factor");
                match s.products.get_mut(&id) {
                    Some(p) => {
                        p.modo = modo;
                        p.factor = factor;
                        Ok(Value::Null)
                    }
                    None => Err(rejected(command, "producto inexistente")),
                }
            }
            "stock_mov_listar" => {
                let id = int(args, "id_producto");
                let limit = int(args, "limit").max(0) as usize;
                Ok(Value::Array(
                    s.movements
                        .iter()
                        .rev()
                        .filter(|(p, _)| *p == id)
                        .take(limit)
                        .map(|(_, m)| m.clone())
                        .collect(),
                ))
            }
            "precio_hist_listar" => {
                let id = int(args, "id_producto");
                let tipo = text(args, "tipo");
                let limit = int(args, "limit").max(0) as usize;
                Ok(Value::Array(
                    s.prices
                        .iter()
                        .rev()
                        .filter(|(p, e)| *p == id && e["tipo"] == tipo.as_str())
                        .take(limit)
                        .map(|(_, e)| e.clone())
                        .collect(),
                ))
            }

            // promo
            "promo_combo_crear" => {
                let id = s.next_id();
                let items = field(args, "items")
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .map(|i| (i["id_producto"].as_i64().unwrap_or_default(), i["cantidad"].as_i64().unwrap_or_default()))
                            .collect()
                    })
                    .unwrap_or_default();
                s.combos.insert(
                    id,
                    FakeCombo {
                        id,
                        nombre: text(args, "nombre"),
                        precio_pack: int(args, "precio_pack"),
                        precio_min_total: int(args, "precio_min_total"),
                        activo: true,
                        items,
                    },
                );
                Ok(json!(id))
            }
            "promo_combo_listar" => {
                let solo_activos = args["solo_activos"].as_bool().unwrap_or(false);
                Ok(Value::Array(
                    s.combos
                        .values()
                        .filter(|c| !solo_activos || c.activo)
                        .map(|c| {
                            json!({"id_combo": c.id, "nombre": c.nombre, "precio_pack": c.precio_pack,
                                   "precio_min_total": c.precio_min_total, "activo": c.activo,
                                   "resumen": format!("{} productos", c.items.len())})
                        })
                        .collect(),
                ))
            }
            "promo_combo_detalle" => {
                let id = int(args, "id_combo");
                let Some(c) = s.combos.get(&id) else {
                    return Err(rejected(command, "combo inexistente"));
                };
                let items: Vec<Value> = c
                    .items
                    .iter()
                    .map(|(id_producto, cantidad)| {
                        let (nombre, precio) = s
                            .products
                            .get(id_producto)
                            .map(|p| (p.nombre.clone(), p.precio))
                            .unwrap_or_default();
                        json!({"id_producto": id_producto, "nombre": nombre, "cantidad": cantidad,
                               "precio_unitario": precio, "subtotal_sugerido": precio * cantidad})
                    })
                    .collect();
                let total: i64 = items
                    .iter()
                    .filter_map(|i| i["subtotal_sugerido"].as_i64())
                    .sum();
                Ok(json!({
                    "combo": {"id_combo": c.id, "nombre": c.nombre, "precio_pack": c.precio_pack,
                              "precio_min_total": c.precio_min_total, "activo": c.activo,
                              "creado_en": "2026-10-01 09:00:00"},
                    "items": items,
                    "total_sugerido": total,
                }))
            }
            "promo_combo_eliminar" => {
                let id = int(args, "id_combo");
                match s.combos.get_mut(&id) {
                    Some(c) => {
                        c.activo = false;
                        Ok(Value::Null)
                    }
                    None => Err(rejected(command, "combo inexistente")),
                }
            }

            // ledger
            "gasto_registrar" => {
                let id = s.next_id();
                let now = s.now();
                s.gastos.push(json!({
                    "id_gasto_negocio": id,
                    "fecha_hora": now,
                    "categoria": text(args, "categoria"),
                    "descripcion": text(args, "descripcion"),
                    "monto": int(args, "monto"),
                    "id_usuario": s.session.as_ref().map(|x| x.0),
                }));
                Ok(json!(id))
            }
            "sueldo_registrar" => {
                let id = s.next_id();
                let now = s.now();
                s.sueldos.push(json!({
                    "id_sueldo_pago": id,
                    "fecha_hora": now,
                    "descripcion": text(args, "descripcion"),
                    "monto": int(args, "monto"),
                    "id_usuario_destino": int(args, "id_usuario_destino"),
                }));
                Ok(json!(id))
            }
            "gasto_listar_por_periodo" | "gasto_total_por_periodo" => {
                let filtro = args.get("filtro").or_else(|| args.get("input")).cloned().unwrap_or_default();
                let categoria = filtro["categoria"].as_str().map(str::to_string);
                let rows: Vec<Value> = s
                    .gastos
                    .iter()
                    .filter(|g| categoria.as_deref().map_or(true, |c| g["categoria"] == c))
                    .cloned()
                    .collect();
                if command == "gasto_total_por_periodo" {
                    let total: i64 = rows.iter().filter_map(|g| g["monto"].as_i64()).sum();
                    Ok(json!({"total": total}))
                } else {
                    Ok(Value::Array(rows))
                }
            }
            "sueldo_listar_por_periodo" | "sueldo_total_por_periodo" => {
                let filtro = args.get("filtro").or_else(|| args.get("input")).cloned().unwrap_or_default();
                let destino = filtro["id_usuario_destino"].as_i64();
                let rows: Vec<Value> = s
                    .sueldos
                    .iter()
                    .filter(|g| destino.map_or(true, |d| g["id_usuario_destino"] == d))
                    .cloned()
                    .collect();
                if command == "sueldo_total_por_periodo" {
                    let total: i64 = rows.iter().filter_map(|g| g["monto"].as_i64()).sum();
                    Ok(json!({"total": total}))
                } else {
                    Ok(Value::Array(rows))
                }
            }

            other => Err(rejected(other, format!("comando desconocido: {other}"))),
        }
    }
}

#[async_trait]
impl CommandTransport for FakeBackend {
    async fn invoke(&self, command: &str, args: Value) -> ClientResult<Value> {
        let delay = self.with(|s| {
            s.calls.push((command.to_string(), args.clone()));
            s.delays.get(command).copied()
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.handle(command, &args)
    }
}
