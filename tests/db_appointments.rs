// tests/db_appointments.rs
// Regras transacionais de agendamento e estoque contra um Postgres real.
// Sem DATABASE_URL os testes retornam sem fazer nada.

use agenda_backend::{
    common::error::AppError,
    config::{AppState, Config},
    db::{InventoryRepository, UserRepository},
    models::{
        appointment::{AppointmentDetail, AppointmentStatus},
        inventory::{MovementFilter, StockMovementEntry, StockMovementKind},
    },
};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sqlx::{pool::PoolConnection, postgres::PgPoolOptions, Connection, PgConnection, PgPool, Postgres};
use uuid::Uuid;

struct TestDb {
    url: String,
    pool: PgPool,
    state: AppState,
    user_id: Uuid,
}

impl TestDb {
    async fn connect() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL não definida; teste de banco ignorado");
            return Ok(None);
        };

        let pool = PgPoolOptions::new().max_connections(6).connect(&url).await?;
        sqlx::migrate!().run(&pool).await?;

        let user = UserRepository::new(pool.clone())
            .create_user(&pool, &format!("{}@agenda.test", Uuid::new_v4()), "hash-de-teste", None)
            .await?;

        let config = Config {
            database_url: url.clone(),
            jwt_secret: "segredo-de-teste".to_string(),
            jwt_ttl_days: 7,
            server_addr: "127.0.0.1:0".to_string(),
            db_max_connections: 6,
        };
        let state = AppState::with_pool(pool.clone(), config);

        Ok(Some(Self { url, pool, state, user_id: user.id }))
    }

    /// Conexão com `app.user_id` definido, como a de uma requisição autenticada.
    async fn conn(&self) -> Result<PoolConnection<Postgres>> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT set_config('app.user_id', $1, false)")
            .bind(self.user_id.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(conn)
    }

    async fn staff(&self, conn: &mut PgConnection) -> Result<Uuid> {
        let staff = self
            .state
            .staff_service
            .create(&mut *conn, &payload(json!({ "name": "Bia", "phone": "11 90000-0000" })))
            .await?;
        Ok(staff.id)
    }

    /// Produto novo com `stock` unidades de entrada.
    async fn product(&self, conn: &mut PgConnection, stock: i64) -> Result<Uuid> {
        let product = self
            .state
            .inventory_service
            .create_product(
                &mut *conn,
                &payload(json!({ "name": format!("Produto {}", Uuid::new_v4()), "salePrice": 30 })),
            )
            .await?;
        if stock > 0 {
            self.state
                .inventory_service
                .record_movement(
                    &mut *conn,
                    StockMovementKind::In,
                    &payload(json!({ "productId": product.id, "quantity": stock, "reason": "Compra" })),
                )
                .await?;
        }
        Ok(product.id)
    }

    async fn movements(&self, conn: &mut PgConnection, product_id: Uuid) -> Result<Vec<StockMovementEntry>> {
        let filter = MovementFilter { product_id: Some(product_id), ..Default::default() };
        Ok(self.state.inventory_service.movements(&mut *conn, &filter).await?)
    }
}

fn payload<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("payload de teste válido")
}

// Data aleatória bem no futuro: bloqueios de um teste não alcançam os outros.
fn random_date() -> NaiveDate {
    let offset = (Uuid::new_v4().as_u128() % 20_000) as i64;
    NaiveDate::from_ymd_opt(2090, 1, 1).expect("data base") + Duration::days(offset)
}

fn appointment(date: NaiveDate, staff_id: Uuid, start: &str, end: &str, status: &str, products: Value) -> Value {
    json!({
        "date": date,
        "startTime": start,
        "endTime": end,
        "staffId": staff_id,
        "status": status,
        "products": products,
    })
}

fn id_of(detail: &AppointmentDetail) -> Uuid {
    detail.entry.appointment.id
}

async fn balance(conn: &mut PgConnection, product_id: Uuid) -> Result<Decimal> {
    Ok(InventoryRepository::new().balance(&mut *conn, product_id).await?)
}

#[tokio::test]
async fn completing_writes_one_sale_per_line_and_reopening_reverts() -> Result<()> {
    let Some(db) = TestDb::connect().await? else { return Ok(()) };
    let mut conn = db.conn().await?;
    let staff = db.staff(&mut conn).await?;
    let shampoo = db.product(&mut conn, 2).await?;
    let mask = db.product(&mut conn, 5).await?;

    let body = appointment(
        random_date(),
        staff,
        "10:00",
        "11:00",
        "completed",
        json!([{ "productId": shampoo, "quantity": 2 }, { "productId": mask, "quantity": 1 }]),
    );
    let detail = db.state.appointment_service.save(&mut *conn, None, &payload(body)).await?;
    let id = id_of(&detail);

    assert_eq!(detail.products.len(), 2);
    // Sem serviço: 2 × 30 + 1 × 30
    assert_eq!(detail.entry.appointment.total_amount, Some(Decimal::from(90)));
    assert_eq!(balance(&mut conn, shampoo).await?, Decimal::ZERO);
    assert_eq!(balance(&mut conn, mask).await?, Decimal::from(4));

    let sales: Vec<_> = db
        .movements(&mut conn, shampoo)
        .await?
        .into_iter()
        .filter(|m| m.movement.kind == StockMovementKind::Out)
        .collect();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].movement.reason, "Venda");
    assert_eq!(sales[0].movement.notes.as_deref(), Some("Venda no agendamento"));
    assert_eq!(sales[0].movement.appointment_id, Some(id));
    assert_eq!(sales[0].movement.quantity, Decimal::from(2));

    let reopened = db
        .state
        .appointment_service
        .change_status(&mut *conn, id, AppointmentStatus::Pending)
        .await?;
    assert_eq!(reopened.entry.appointment.status, AppointmentStatus::Pending);
    assert_eq!(balance(&mut conn, shampoo).await?, Decimal::from(2));
    assert_eq!(balance(&mut conn, mask).await?, Decimal::from(5));

    // Finalizar de novo pelo PATCH gera as mesmas baixas
    db.state
        .appointment_service
        .change_status(&mut *conn, id, AppointmentStatus::Completed)
        .await?;
    assert_eq!(balance(&mut conn, shampoo).await?, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn editing_a_completed_appointment_recredits_its_own_consumption() -> Result<()> {
    let Some(db) = TestDb::connect().await? else { return Ok(()) };
    let mut conn = db.conn().await?;
    let staff = db.staff(&mut conn).await?;
    let shampoo = db.product(&mut conn, 2).await?;
    let date = random_date();

    let lines = |quantity: i64| json!([{ "productId": shampoo, "quantity": quantity }]);
    let detail = db
        .state
        .appointment_service
        .save(&mut *conn, None, &payload(appointment(date, staff, "09:00", "10:00", "completed", lines(2))))
        .await?;
    let id = id_of(&detail);
    assert_eq!(balance(&mut conn, shampoo).await?, Decimal::ZERO);

    // Mesma quantidade: o saldo conferido inclui o que este agendamento já baixou
    db.state
        .appointment_service
        .save(&mut *conn, Some(id), &payload(appointment(date, staff, "09:00", "10:00", "completed", lines(2))))
        .await?;
    assert_eq!(balance(&mut conn, shampoo).await?, Decimal::ZERO);
    assert_eq!(db.movements(&mut conn, shampoo).await?.len(), 2);

    let err = db
        .state
        .appointment_service
        .save(&mut *conn, Some(id), &payload(appointment(date, staff, "09:00", "10:00", "completed", lines(3))))
        .await
        .expect_err("3 unidades com saldo 2");
    assert!(
        matches!(&err, AppError::InsufficientStock { available, requested, .. }
            if *available == Decimal::from(2) && *requested == Decimal::from(3)),
        "{:?}",
        err
    );
    // A transação recusada não deixa rastro
    assert_eq!(balance(&mut conn, shampoo).await?, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn delete_removes_lines_and_returns_stock() -> Result<()> {
    let Some(db) = TestDb::connect().await? else { return Ok(()) };
    let mut conn = db.conn().await?;
    let staff = db.staff(&mut conn).await?;
    let shampoo = db.product(&mut conn, 2).await?;

    let body = appointment(
        random_date(),
        staff,
        "14:00",
        "15:00",
        "completed",
        json!([{ "productId": shampoo, "quantity": 2 }]),
    );
    let id = id_of(&db.state.appointment_service.save(&mut *conn, None, &payload(body)).await?);

    db.state.appointment_service.delete(&mut *conn, id).await?;

    assert_eq!(balance(&mut conn, shampoo).await?, Decimal::from(2));
    assert!(db.movements(&mut conn, shampoo).await?.iter().all(|m| m.movement.appointment_id.is_none()));
    let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointment_products WHERE appointment_id = $1")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    assert_eq!(lines, 0);
    assert!(matches!(
        db.state.appointment_service.get_detail(&mut conn, id).await,
        Err(AppError::ResourceNotFound("appointment"))
    ));
    Ok(())
}

#[tokio::test]
async fn manual_exit_beyond_balance_is_rejected() -> Result<()> {
    let Some(db) = TestDb::connect().await? else { return Ok(()) };
    let mut conn = db.conn().await?;
    let shampoo = db.product(&mut conn, 2).await?;

    let err = db
        .state
        .inventory_service
        .record_movement(
            &mut *conn,
            StockMovementKind::Out,
            &payload(json!({ "productId": shampoo, "quantity": 3, "reason": "Perda" })),
        )
        .await
        .expect_err("saída maior que o saldo");
    assert!(matches!(err, AppError::InsufficientStock { .. }), "{:?}", err);
    assert_eq!(balance(&mut conn, shampoo).await?, Decimal::from(2));
    Ok(())
}

#[tokio::test]
async fn overlapping_slot_for_same_staff_conflicts() -> Result<()> {
    let Some(db) = TestDb::connect().await? else { return Ok(()) };
    let mut conn = db.conn().await?;
    let staff = db.staff(&mut conn).await?;
    let other_staff = db.staff(&mut conn).await?;
    let date = random_date();
    let service = &db.state.appointment_service;

    let first = id_of(
        &service
            .save(&mut *conn, None, &payload(appointment(date, staff, "10:00", "11:00", "confirmed", json!([]))))
            .await?,
    );

    let err = service
        .save(&mut *conn, None, &payload(appointment(date, staff, "10:30", "11:30", "pending", json!([]))))
        .await
        .expect_err("mesmo colaborador, horário sobreposto");
    assert!(matches!(err, AppError::AppointmentConflict(id) if id == first), "{:?}", err);

    // Encostado no fim e outro colaborador no mesmo horário passam
    service
        .save(&mut *conn, None, &payload(appointment(date, staff, "11:00", "11:30", "pending", json!([]))))
        .await?;
    service
        .save(&mut *conn, None, &payload(appointment(date, other_staff, "10:00", "11:00", "pending", json!([]))))
        .await?;

    // Cancelado libera o horário; reativá-lo volta a conflitar
    service.change_status(&mut *conn, first, AppointmentStatus::Cancelled).await?;
    let second = id_of(
        &service
            .save(&mut *conn, None, &payload(appointment(date, staff, "10:00", "11:00", "pending", json!([]))))
            .await?,
    );
    let err = service
        .change_status(&mut *conn, first, AppointmentStatus::Confirmed)
        .await
        .expect_err("reativar sobre horário ocupado");
    assert!(matches!(err, AppError::AppointmentConflict(id) if id == second), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn schedule_block_rejects_appointments_on_that_day() -> Result<()> {
    let Some(db) = TestDb::connect().await? else { return Ok(()) };
    let mut conn = db.conn().await?;
    let staff = db.staff(&mut conn).await?;
    let date = random_date();

    let block = db
        .state
        .schedule_service
        .create_block(&mut *conn, &payload(json!({ "date": date, "kind": "holiday", "reason": "Feriado" })))
        .await?;

    let err = db
        .state
        .appointment_service
        .save(&mut *conn, None, &payload(appointment(date, staff, "08:00", "09:00", "pending", json!([]))))
        .await
        .expect_err("dia inteiro bloqueado");
    assert!(matches!(err, AppError::ScheduleBlocked(id) if id == block.id), "{:?}", err);

    // Cancelado não ocupa a agenda, então o bloqueio não se aplica
    db.state
        .appointment_service
        .save(&mut *conn, None, &payload(appointment(date, staff, "08:00", "09:00", "cancelled", json!([]))))
        .await?;

    db.state.schedule_service.delete_block(&mut *conn, block.id).await?;
    Ok(())
}

#[tokio::test]
async fn concurrent_saves_of_the_same_slot_keep_only_one() -> Result<()> {
    let Some(db) = TestDb::connect().await? else { return Ok(()) };
    let mut setup = db.conn().await?;
    let service = &db.state.appointment_service;

    for _ in 0..10 {
        let staff = db.staff(&mut setup).await?;
        let date = random_date();
        let body = payload(appointment(date, staff, "10:00", "11:00", "confirmed", json!([])));

        let mut left = db.conn().await?;
        let mut right = db.conn().await?;
        let (a, b) = tokio::join!(
            service.save(&mut *left, None, &body),
            service.save(&mut *right, None, &body),
        );

        let saved = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(saved, 1, "apenas uma gravação deve vencer: {:?} / {:?}", a.as_ref().err(), b.as_ref().err());
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(AppError::AppointmentConflict(_))));

        let persisted: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments WHERE staff_id = $1 AND date = $2 AND status <> 'cancelled'",
        )
        .bind(staff)
        .bind(date)
        .fetch_one(&mut *setup)
        .await?;
        assert_eq!(persisted, 1);
    }
    Ok(())
}

#[tokio::test]
async fn rows_are_invisible_without_user_id() -> Result<()> {
    let Some(db) = TestDb::connect().await? else { return Ok(()) };
    let mut conn = db.conn().await?;
    let shampoo = db.product(&mut conn, 1).await?;

    // Conexão nova, fora da pool: app.user_id nunca foi definido nela
    let mut anonymous = PgConnection::connect(&db.url).await?;
    let bypasses: bool = sqlx::query_scalar(
        "SELECT rolsuper OR rolbypassrls FROM pg_roles WHERE rolname = current_user",
    )
    .fetch_one(&mut anonymous)
    .await?;
    if bypasses {
        eprintln!("papel do banco ignora RLS; verificação pulada");
        return Ok(());
    }

    let visible: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = $1")
        .bind(shampoo)
        .fetch_one(&mut anonymous)
        .await?;
    assert_eq!(visible, 0);

    let stock_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE product_id = $1")
        .bind(shampoo)
        .fetch_one(&mut anonymous)
        .await?;
    assert_eq!(stock_rows, 0);

    // A conexão da requisição continua enxergando
    let visible: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = $1")
        .bind(shampoo)
        .fetch_one(&mut *conn)
        .await?;
    assert_eq!(visible, 1);
    Ok(())
}
