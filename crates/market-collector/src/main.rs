//! Market data collector CLI.

use chrono::Utc;
use clap::{Parser, Subcommand};
use market_collector::{
    CollectorConfig, CollectorError, MarketDataService, RefreshOrchestrator, RefreshOutcome,
    SessionStatus,
};
use market_core::{init_logging, Dataset, LogConfig, SessionClock};
use market_data::{
    AccountStore, FlowPeriod, InMemoryMarketDataStore, MarketDataStore, NiftyTraderClient,
    PgAccountStore, PgMarketDataStore, YahooSparkProvider,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "market-collector")]
#[command(about = "Market data refresh/cache collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error). 지정하지 않으면 설정값 사용
    #[arg(long)]
    log_level: Option<String>,

    /// 설정 파일 경로 (TOML). 지정하지 않으면 환경변수에서 로드
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// 갱신 사이클 1회 실행
    Refresh,

    /// 데몬 모드: 주기적으로 갱신 사이클 실행
    Daemon,

    /// 읽기 API 결과를 JSON으로 출력
    Show {
        /// 데이터셋 (indian_indices, top_movers, global_indices, crypto, commodities, fii_dii, ipos)
        dataset: Dataset,

        /// FII/DII 조회 월 (YYYY-MM)
        #[arg(long)]
        year_month: Option<String>,

        /// FII/DII 조회 유형
        #[arg(long, default_value = FlowPeriod::DEFAULT_REQUEST_TYPE)]
        request_type: String,
    },

    /// 거래 세션 상태 출력
    Session,

    /// 브로커 계정 및 토큰 상태 출력
    Accounts,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 설정 로드
    let config = match &cli.config {
        Some(path) => CollectorConfig::from_file(path)?,
        None => CollectorConfig::from_env()?,
    };

    // 로깅 초기화
    let mut log_config = LogConfig::from(&config.logging);
    if let Some(level) = &cli.log_level {
        log_config.level = level.clone();
    }
    init_logging(log_config)?;

    tracing::info!("Market Data Collector 시작");

    let session = config.session_clock()?;

    match cli.command {
        Commands::Session => print_session(&session)?,
        Commands::Accounts => {
            let store = connect_store(&config).await?.ok_or_else(|| {
                CollectorError::Config("accounts 명령은 DATABASE_URL이 필요합니다".to_string())
            })?;
            print_accounts(&PgAccountStore::new(store.pool().clone())).await?;
            store.pool().close().await;
        }
        command => run(command, &config, session).await?,
    }

    tracing::info!("Market Data Collector 종료");

    Ok(())
}

/// DB URL이 있으면 PostgreSQL 캐시 저장소 연결.
async fn connect_store(config: &CollectorConfig) -> market_data::Result<Option<PgMarketDataStore>> {
    match &config.database.url {
        Some(url) => {
            let store = PgMarketDataStore::connect(url, config.database.max_connections).await?;
            tracing::info!("데이터베이스 연결 성공");
            Ok(Some(store))
        }
        None => Ok(None),
    }
}

/// 갱신/조회 명령 실행.
async fn run(
    command: Commands,
    config: &CollectorConfig,
    session: SessionClock,
) -> Result<(), Box<dyn std::error::Error>> {
    // 캐시 저장소 (DB URL 없으면 메모리)
    let pg_store = connect_store(config).await?;
    let store: Arc<dyn MarketDataStore> = match &pg_store {
        Some(store) => Arc::new(store.clone()),
        None => {
            tracing::warn!("DATABASE_URL 미설정, 메모리 캐시 사용");
            Arc::new(InMemoryMarketDataStore::new())
        }
    };

    let timeout = config.providers.http_timeout();
    let quotes = Arc::new(YahooSparkProvider::new(
        config.providers.yahoo_base_url.clone(),
        timeout,
    )?);
    let flows = Arc::new(NiftyTraderClient::new(
        config.providers.niftytrader_base_url.clone(),
        timeout,
    )?);

    let service = MarketDataService::new(
        quotes,
        flows,
        store,
        session,
        config.refresh.movers_limit,
    );
    let mut orchestrator = RefreshOrchestrator::new(service, config.update_interval());

    match command {
        Commands::Refresh => match orchestrator.refresh().await {
            RefreshOutcome::Completed(report) => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            RefreshOutcome::NotDue { remaining } => {
                tracing::info!(remaining_secs = remaining.as_secs(), "갱신 주기 전");
            }
        },
        Commands::Daemon => {
            let tick = config.refresh.daemon_tick();
            tracing::info!(
                "=== 데몬 모드 시작 (틱: {}초, 갱신 간격: {}초) ===",
                tick.as_secs(),
                config.update_interval().as_secs()
            );

            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        if let RefreshOutcome::NotDue { remaining } = orchestrator.refresh().await {
                            tracing::debug!(remaining_secs = remaining.as_secs(), "다음 갱신 대기");
                        }
                    }
                }
            }
        }
        Commands::Show {
            dataset,
            year_month,
            request_type,
        } => {
            let period = year_month.map(|ym| FlowPeriod::new(ym, request_type));
            let payload = orchestrator.service().get_dataset(dataset, period).await;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Session | Commands::Accounts => {}
    }

    if let Some(store) = pg_store {
        store.pool().close().await;
    }

    Ok(())
}

/// 세션 상태 출력.
fn print_session(session: &SessionClock) -> Result<(), serde_json::Error> {
    let now = Utc::now();
    let status = SessionStatus::at(session, now);

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "timezone": session.timezone().name(),
            "local_time": session.to_local(now).format("%Y-%m-%d %H:%M:%S").to_string(),
            "is_open": status.is_open,
            "seconds_until_open": status.seconds_until_open,
        }))?
    );
    Ok(())
}

/// 계정 목록과 토큰 경과 시간 출력 (비밀 값은 출력하지 않음).
async fn print_accounts(store: &dyn AccountStore) -> market_data::Result<()> {
    let now = Utc::now();
    let accounts = store.get_accounts().await?;

    if accounts.is_empty() {
        println!("활성 계정 없음");
        return Ok(());
    }

    for account in accounts {
        let token = match account.token_age(now) {
            Some(age) => format!("토큰 발급 {}분 전", age.num_minutes()),
            None => "토큰 없음".to_string(),
        };
        println!(
            "{}  credentials={}  full_automation={}  {}",
            account.masked_api_key(),
            account.has_required_credentials(),
            account.supports_full_automation(),
            token
        );
    }

    Ok(())
}
