//! Embedded single-file pages (HTML + CSS + JS). All state lives in the
//! server-side session; the scripts only push edits and render views.

const STYLE: &str = r#"
  :root {
    --bg: #0f1d3a;
    --card: rgba(255,255,255,.08);
    --border: rgba(255,255,255,.18);
    --accent: #facc15;
    --green: #22c55e;
    --blue: #93c5fd;
    --red: #ff4f6a;
    --text: #f1f5f9;
    --muted: #a5b4cf;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: linear-gradient(135deg, #1e3a8a, #1e40af 50%, #166534); min-height: 100vh; color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { text-align: center; padding: 2rem 1rem 1rem; }
  header h1 { font-size: 2.4rem; font-weight: 700; }
  header p { color: var(--muted); margin: .5rem 0 1rem; }
  nav { display: flex; justify-content: center; gap: 1rem; }
  nav a { color: var(--text); text-decoration: none; border: 1px solid var(--border); padding: .4rem 1rem; border-radius: 6px; background: var(--card); }
  nav a.active { border-color: var(--accent); color: var(--accent); }
  main { max-width: 1200px; margin: 0 auto; padding: 1.5rem; display: grid; gap: 1.5rem; grid-template-columns: repeat(auto-fit, minmax(260px, 1fr)); }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
  .panel h2 { font-size: 1.1rem; margin-bottom: 1rem; color: var(--accent); }
  label { display: block; font-size: .85rem; color: var(--muted); margin: .6rem 0 .3rem; }
  select, input[type=number] { width: 100%; padding: .5rem; border-radius: 6px; border: 1px solid var(--border); background: rgba(255,255,255,.15); color: var(--text); }
  select option { background: #111827; }
  .row { display: grid; grid-template-columns: 1fr 1fr; gap: .8rem; }
  .vs, .score { text-align: center; font-size: 1.6rem; font-weight: 700; color: var(--accent); margin: .8rem 0; }
  button.primary { width: 100%; margin-top: 1.2rem; padding: .8rem; border: none; border-radius: 8px; font-weight: 700; font-size: 1rem; color: #fff; cursor: pointer; background: linear-gradient(90deg, #eab308, #f97316); }
  button.primary:disabled { opacity: .5; cursor: not-allowed; }
  .bar { height: 10px; border-radius: 5px; background: rgba(255,255,255,.2); overflow: hidden; margin: .3rem 0 .9rem; }
  .bar div { height: 100%; background: var(--accent); }
  .line { display: flex; justify-content: space-between; }
  .stat { display: flex; justify-content: space-between; padding: .5rem .7rem; border: 1px solid var(--border); border-radius: 6px; margin-top: .5rem; }
  .fav { text-align: center; margin-top: 1rem; padding: .8rem; border: 1px solid var(--accent); border-radius: 8px; }
  .fav strong { display: block; font-size: 1.3rem; color: var(--accent); }
  .empty { color: var(--muted); text-align: center; padding: 2rem 0; }
  #toast { position: fixed; right: 1.5rem; bottom: 1.5rem; max-width: 320px; padding: .9rem 1.1rem; border-radius: 8px; background: #111827; border: 1px solid var(--border); display: none; }
  #toast.error { border-color: var(--red); }
  #toast strong { display: block; margin-bottom: .2rem; }
"#;

const COMMON_JS: &str = r#"
function esc(text) {
  return String(text).replace(/[&<>"']/g, c =>
    ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[c]);
}
async function api(method, url, body) {
  const r = await fetch(url, {
    method,
    headers: body ? { 'Content-Type': 'application/json' } : {},
    body: body ? JSON.stringify(body) : undefined,
  });
  const data = await r.json().catch(() => ({}));
  if (!r.ok) { throw data; }
  return data;
}
let toastTimer;
function toast(title, msg, isError) {
  const t = document.getElementById('toast');
  t.innerHTML = `<strong>${esc(title)}</strong>${esc(msg)}`;
  t.className = isError ? 'error' : '';
  t.style.display = 'block';
  clearTimeout(toastTimer);
  toastTimer = setTimeout(() => { t.style.display = 'none'; }, 3500);
}
function reportError(e) {
  if (e && e.notify === false) return;
  toast(e.title || 'Error', e.error || 'Request failed', true);
}
async function fillTeams(select, exclude, selected, placeholder) {
  const q = exclude ? '?exclude=' + encodeURIComponent(exclude) : '';
  const teams = await api('GET', '/api/teams' + q);
  select.innerHTML = `<option value="">${placeholder}</option>` + teams.map(t =>
    `<option value="${esc(t.name)}" ${t.name === selected ? 'selected' : ''}>${esc(t.name)} (${esc(t.code)})</option>`).join('');
}
function bar(label, pct) {
  return `<div class="line"><span>${esc(label)}</span><strong>${pct}%</strong></div>
          <div class="bar"><div style="width:${pct}%"></div></div>`;
}
async function waitWhileLoading(url, render) {
  for (;;) {
    const view = await api('GET', url);
    render(view);
    if (!view.loading) return view;
    await new Promise(r => setTimeout(r, 250));
  }
}
"#;

const PREMATCH_BODY: &str = r#"
<header>
  <h1>🏆 T20 League Predictor</h1>
  <p>Pick two teams and a venue to see who is favoured</p>
  <nav><a class="active" href="/">Match Predictor</a><a href="/live">Live Predictor</a></nav>
</header>
<main>
  <section class="panel">
    <h2>Select Teams</h2>
    <label for="team1">Team 1</label><select id="team1"></select>
    <div class="vs">VS</div>
    <label for="team2">Team 2</label><select id="team2"></select>
  </section>
  <section class="panel">
    <h2>Match Venue</h2>
    <label for="venue">Select Venue</label><select id="venue"></select>
    <div id="venue-info" class="empty" style="padding:.6rem 0"></div>
    <button class="primary" id="predict" disabled>Predict Winner</button>
  </section>
  <section class="panel">
    <h2>Prediction</h2>
    <div id="result"><div class="empty">Select teams and venue to get prediction</div></div>
  </section>
</main>
<div id="toast"></div>
<script>
let sessionUrl, venues = [];

function render(view) {
  const btn = document.getElementById('predict');
  btn.disabled = !view.can_predict;
  btn.textContent = view.loading ? 'Analyzing…' : 'Predict Winner';
  const el = document.getElementById('result');
  const sel = view.selection;
  const v = venues.find(x => x.name === sel.venue);
  document.getElementById('venue-info').textContent = v ? `${v.city} • Capacity: ${v.capacity_label}` : '';
  if (view.loading) { el.innerHTML = '<div class="empty">Analyzing match data…</div>'; return; }
  const b = view.breakdown;
  if (!b) { el.innerHTML = '<div class="empty">Select teams and venue to get prediction</div>'; return; }
  el.innerHTML = `
    <div class="fav">Predicted Winner<strong>${esc(b.winner)}</strong></div><br>
    ${bar(b.team1.team, b.team1.percent)}
    ${bar(b.team2.team, b.team2.percent)}
    <div class="stat"><span>Confidence</span><strong>${b.confidence}</strong></div>
    <div class="stat"><span>Win Probability</span><strong>${b.win_percent}%</strong></div>
    <div class="stat"><span>Venue</span><span>${esc(b.venue)}</span></div>`;
}

async function edit(field, value) {
  try { render(await api('PATCH', sessionUrl, { field, value: value || null })); }
  catch (e) { reportError(e); }
}

async function refreshTeams(view) {
  const s = view.selection;
  await fillTeams(document.getElementById('team1'), s.team2, s.team1, 'Select Team 1');
  await fillTeams(document.getElementById('team2'), s.team1, s.team2, 'Select Team 2');
}

async function init() {
  const view = await api('POST', '/api/prematch/sessions');
  sessionUrl = '/api/prematch/sessions/' + view.id;
  venues = await api('GET', '/api/venues');
  document.getElementById('venue').innerHTML = '<option value="">Choose cricket ground</option>' +
    venues.map(v => `<option value="${esc(v.name)}">${esc(v.name)}</option>`).join('');
  await refreshTeams(view);
  render(view);

  for (const field of ['team1', 'team2']) {
    document.getElementById(field).addEventListener('change', async e => {
      await edit(field, e.target.value);
      refreshTeams(await api('GET', sessionUrl));
    });
  }
  document.getElementById('venue').addEventListener('change', e => edit('venue', e.target.value));
  document.getElementById('predict').addEventListener('click', async () => {
    try {
      render(await api('POST', sessionUrl + '/predict'));
      await waitWhileLoading(sessionUrl, render);
    } catch (e) { reportError(e); }
  });
}
init().catch(reportError);
</script>
"#;

const LIVE_BODY: &str = r#"
<header>
  <h1>📈 Live Match Predictor</h1>
  <p>Win probability from the current match situation</p>
  <nav><a href="/">Match Predictor</a><a class="active" href="/live">Live Predictor</a></nav>
</header>
<main>
  <section class="panel">
    <h2>Teams</h2>
    <label for="batting_team">Batting Team</label><select id="batting_team"></select>
    <label for="bowling_team">Bowling Team</label><select id="bowling_team"></select>
  </section>
  <section class="panel">
    <h2>Current Score</h2>
    <div class="row">
      <div><label for="current_runs">Runs</label><input type="number" id="current_runs" min="0" value="0"></div>
      <div><label for="current_wickets">Wickets</label><input type="number" id="current_wickets" min="0" max="10" value="0"></div>
    </div>
    <div class="score" id="scoreline">0/0</div>
  </section>
  <section class="panel">
    <h2>Match Progress</h2>
    <div class="row">
      <div><label for="overs_completed">Overs</label><input type="number" id="overs_completed" min="0" max="20" value="0"></div>
      <div><label for="balls_in_current_over">Balls</label><input type="number" id="balls_in_current_over" min="0" max="5" value="0"></div>
    </div>
    <label><input type="checkbox" id="is_second_innings"> Second Innings</label>
    <div id="target-box" style="display:none">
      <label for="target_score">Target Score</label><input type="number" id="target_score" min="1" placeholder="Target">
    </div>
  </section>
  <section class="panel">
    <h2>Live Prediction</h2>
    <div id="result"><div class="empty">Update match details and click predict to see live win probabilities</div></div>
    <button class="primary" id="predict" disabled>Update Prediction</button>
  </section>
</main>
<div id="toast"></div>
<script>
let sessionUrl;

function render(view) {
  const s = view.selection;
  document.getElementById('scoreline').textContent = `${s.current_runs}/${s.current_wickets}`;
  document.getElementById('target-box').style.display = s.is_second_innings ? 'block' : 'none';
  const btn = document.getElementById('predict');
  btn.disabled = !view.can_predict;
  btn.textContent = view.loading ? 'Calculating…' : 'Update Prediction';
  const el = document.getElementById('result');
  if (view.loading) { el.innerHTML = '<div class="empty">Calculating live probabilities…</div>'; return; }
  const b = view.breakdown;
  if (!b) { el.innerHTML = '<div class="empty">Update match details and click predict to see live win probabilities</div>'; return; }
  el.innerHTML = `
    ${bar(b.batting.team, b.batting.percent)}
    ${bar(b.bowling.team, b.bowling.percent)}
    <div class="stat"><span>Current RR</span><strong>${b.current_run_rate}</strong></div>
    ${b.required_run_rate ? `<div class="stat"><span>Required RR</span><strong>${b.required_run_rate}</strong></div>` : ''}
    <div class="stat"><span>Balls Left</span><strong>${b.balls_remaining}</strong></div>
    <div class="fav">Current Favorite<strong>${esc(b.favorite.team)}</strong>${b.favorite.percent}% win probability</div>`;
}

async function edit(field, value) {
  try { render(await api('PATCH', sessionUrl, { field, value })); }
  catch (e) { reportError(e); render(await api('GET', sessionUrl)); }
}

async function refreshTeams(view) {
  const s = view.selection;
  await fillTeams(document.getElementById('batting_team'), s.bowling_team, s.batting_team, 'Select Batting Team');
  await fillTeams(document.getElementById('bowling_team'), s.batting_team, s.bowling_team, 'Select Bowling Team');
}

async function init() {
  const view = await api('POST', '/api/live/sessions');
  sessionUrl = '/api/live/sessions/' + view.id;
  await refreshTeams(view);
  render(view);

  for (const field of ['batting_team', 'bowling_team']) {
    document.getElementById(field).addEventListener('change', async e => {
      await edit(field, e.target.value || null);
      refreshTeams(await api('GET', sessionUrl));
    });
  }
  for (const field of ['current_runs', 'current_wickets', 'overs_completed', 'balls_in_current_over']) {
    document.getElementById(field).addEventListener('change', e => edit(field, Number(e.target.value) || 0));
  }
  document.getElementById('target_score').addEventListener('change',
    e => edit('target_score', e.target.value ? Number(e.target.value) : null));
  document.getElementById('is_second_innings').addEventListener('change',
    e => edit('is_second_innings', e.target.checked));
  document.getElementById('predict').addEventListener('click', async () => {
    try {
      render(await api('POST', sessionUrl + '/predict'));
      await waitWhileLoading(sessionUrl, render);
      toast('Prediction Updated', 'Live win probabilities calculated successfully!', false);
    } catch (e) { reportError(e); }
  });
}
init().catch(reportError);
</script>
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n<script>{COMMON_JS}</script>\n\
         </head>\n<body>{body}</body>\n</html>"
    )
}

pub fn prematch_html() -> String {
    page("T20 League Predictor", PREMATCH_BODY)
}

pub fn live_html() -> String {
    page("Live Match Predictor", LIVE_BODY)
}
